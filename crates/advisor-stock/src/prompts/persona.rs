//! Investor persona menu
//!
//! A persona only changes the system message sent with the analysis prompts;
//! the data blocks are identical across personas.

use serde::{Deserialize, Serialize};

/// The fixed persona menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persona {
    /// Plain financial-analyst framing
    GenericAnalyst,
    /// Long-horizon value investing
    WarrenBuffett,
    /// Growth-at-a-reasonable-price investing
    PeterLynch,
    /// Conservative deep-value investing
    BenjaminGraham,
    /// All-weather allocation and risk management
    RayDalio,
}

impl Persona {
    /// Every selectable persona, in menu order
    pub const ALL: [Persona; 5] = [
        Persona::GenericAnalyst,
        Persona::WarrenBuffett,
        Persona::PeterLynch,
        Persona::BenjaminGraham,
        Persona::RayDalio,
    ];

    /// Human-readable menu label
    pub fn label(&self) -> &'static str {
        match self {
            Persona::GenericAnalyst => "Generic analyst",
            Persona::WarrenBuffett => "Warren Buffett",
            Persona::PeterLynch => "Peter Lynch",
            Persona::BenjaminGraham => "Benjamin Graham",
            Persona::RayDalio => "Ray Dalio",
        }
    }

    /// One-line description shown next to the menu entry
    pub fn description(&self) -> &'static str {
        match self {
            Persona::GenericAnalyst => "general-purpose investment guidance",
            Persona::WarrenBuffett => "long-term value investing",
            Persona::PeterLynch => "growth stock investing",
            Persona::BenjaminGraham => "undervalued stock investing",
            Persona::RayDalio => "all-weather allocation and risk",
        }
    }

    /// The system message sent with every analysis batch for this persona
    pub fn system_text(&self) -> &'static str {
        match self {
            Persona::GenericAnalyst => {
                "You are a capable financial analyst. Provide investment guidance to the user."
            }
            Persona::WarrenBuffett => {
                "You are the great investor Warren Buffett. Provide investment guidance \
                 following value investing principles:\n\
                 - Find undervalued quality companies\n\
                 - Invest for the long term\n\
                 - Analyze company fundamentals (profitability, debt ratio, ROE)"
            }
            Persona::PeterLynch => {
                "You are the great investor Peter Lynch. Provide investment guidance \
                 following growth investing principles:\n\
                 - Analyze high-growth companies\n\
                 - Favor companies whose products or services earn broad public recognition\n\
                 - Check that the P/E ratio is not excessive"
            }
            Persona::BenjaminGraham => {
                "You are the great investor Benjamin Graham. Provide investment guidance \
                 following conservative value investing principles:\n\
                 - Analyze companies with a low price-to-book ratio\n\
                 - Check balance sheet stability\n\
                 - Insist on a margin of safety"
            }
            Persona::RayDalio => {
                "You are the great investor Ray Dalio. Provide investment guidance \
                 following all-weather portfolio principles:\n\
                 - Allocate across stocks, bonds, gold and commodities\n\
                 - Factor in macroeconomic indicators\n\
                 - Consider rebalancing through economic cycles"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_is_complete_and_distinct() {
        assert_eq!(Persona::ALL.len(), 5);

        let mut texts: Vec<&str> = Persona::ALL.iter().map(Persona::system_text).collect();
        texts.dedup();
        assert_eq!(texts.len(), 5, "each persona needs a distinct system text");
    }

    #[test]
    fn test_persona_framing() {
        assert!(Persona::WarrenBuffett.system_text().contains("value investing"));
        assert!(Persona::PeterLynch.system_text().contains("growth"));
        assert!(Persona::BenjaminGraham.system_text().contains("margin of safety"));
        assert!(Persona::RayDalio.system_text().contains("all-weather"));
    }
}
