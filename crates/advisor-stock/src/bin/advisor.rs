//! Stock Advisor CLI
//!
//! An interactive, page-driven stock analysis workflow.
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//!
//! cargo run --bin advisor -p advisor-stock
//! ```

use advisor_llm::providers::OpenAiProvider;
use advisor_stock::api::{FundamentalsClient, MarketDataClient};
use advisor_stock::format::{format_number, format_opt, format_percent};
use advisor_stock::{
    analysis, AdvisorConfig, AdvisorEngine, Holding, Page, Persona, PreferenceStore, Session,
    SymbolAnalysisRecord,
};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Table};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                       Stock Advisor                          ║
║                                                              ║
║  Workflow pages:                                             ║
║    1. select stocks   - manage favorites and holdings        ║
║    2. data analysis   - fetch prices, indicators, financials ║
║    3. select investor - pick an analysis persona             ║
║    4. ai analysis     - run the batched model analysis       ║
║    5. ai chat         - ask follow-up questions              ║
║                                                              ║
║  Type 'help' for the commands of the current page,           ║
║  'reset' to start over, 'exit' to quit.                      ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

fn page_prompt(page: Page) -> &'static str {
    match page {
        Page::SelectStocks => "select-stocks> ",
        Page::DataAnalysis => "data-analysis> ",
        Page::SelectInvestor => "select-investor> ",
        Page::AiAnalysis => "ai-analysis> ",
        Page::AiChat => "ai-chat> ",
    }
}

fn print_help(page: Page) {
    match page {
        Page::SelectStocks => {
            println!("  list                               show favorites and holdings");
            println!("  fav add <SYMBOL>                   add a favorite");
            println!("  fav rm <SYMBOL>                    remove a favorite");
            println!("  hold add <SYMBOL> <QTY> <PRICE> <YYYY-MM-DD>");
            println!("  hold rm <INDEX>                    remove a holding by list index");
            println!("  next                               fetch data and continue");
        }
        Page::DataAnalysis => {
            println!("  show                               latest indicators per symbol");
            println!("  financials <SYMBOL>                statement summary for a symbol");
            println!("  next                               continue to persona selection");
        }
        Page::SelectInvestor => {
            println!("  list                               show the persona menu");
            println!("  pick <N>                           choose a persona and run");
        }
        Page::AiAnalysis => {
            println!("  show                               print the analysis again");
            println!("  chat                               ask follow-up questions");
            println!("  rerun                              pick a persona and run again");
        }
        Page::AiChat => {
            println!("  <free text>                        one chat turn");
            println!("  back                               return to the analysis page");
        }
    }
    println!("  reset                              discard the run, back to page 1");
    println!("  exit                               quit");
}

fn print_preferences(store: &PreferenceStore) {
    if store.favorites().is_empty() {
        println!("No favorites yet.");
    } else {
        println!("Favorites: {}", store.favorites().join(", "));
    }

    if store.holdings().is_empty() {
        println!("No holdings yet.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Symbol", "Quantity", "Purchase price", "Purchased"]);
    for (i, h) in store.holdings().iter().enumerate() {
        table.add_row(vec![
            i.to_string(),
            h.symbol.clone(),
            h.quantity.to_string(),
            format_number(h.price),
            h.purchase_date.to_string(),
        ]);
    }
    println!("{table}");
}

fn print_indicator_table(session: &Session) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Symbol", "Date", "Close", "SMA-20", "SMA-50", "RSI-14", "MACD", "BB upper", "BB lower",
    ]);
    for record in session.records.values() {
        if let Some(bar) = record.latest_bar() {
            table.add_row(vec![
                record.symbol.clone(),
                bar.date.to_string(),
                format_number(bar.close),
                format_opt(bar.sma_20),
                format_opt(bar.sma_50),
                format_opt(bar.rsi_14),
                format_opt(bar.macd),
                format_opt(bar.bb_upper),
                format_opt(bar.bb_lower),
            ]);
        }
    }
    println!("{table}");
}

fn print_financials(record: &SymbolAnalysisRecord) {
    let fin = &record.financials;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Line item", "Value"]);
    table.add_row(vec!["Revenue".to_string(), format_opt(fin.income_statement.revenue)]);
    table.add_row(vec![
        "Operating income".to_string(),
        format_opt(fin.income_statement.operating_income),
    ]);
    table.add_row(vec![
        "Net income".to_string(),
        format_opt(fin.income_statement.net_income),
    ]);
    table.add_row(vec![
        "Total assets".to_string(),
        format_opt(fin.balance_sheet.total_assets),
    ]);
    table.add_row(vec![
        "Total liabilities".to_string(),
        format_opt(fin.balance_sheet.total_liabilities),
    ]);
    table.add_row(vec!["Operating CF".to_string(), format_opt(fin.cash_flow.operating)]);
    table.add_row(vec!["Investing CF".to_string(), format_opt(fin.cash_flow.investing)]);
    table.add_row(vec!["EPS".to_string(), format_opt(fin.key_metrics.eps)]);
    table.add_row(vec!["ROE".to_string(), format_percent(fin.key_metrics.roe)]);
    table.add_row(vec!["Market cap".to_string(), format_opt(fin.valuation.market_cap)]);
    table.add_row(vec!["PER".to_string(), format_opt(fin.valuation.per)]);
    table.add_row(vec!["PBR".to_string(), format_opt(fin.valuation.pbr)]);
    table.add_row(vec!["EV/EBITDA".to_string(), format_opt(fin.valuation.ev_ebitda)]);
    table.add_row(vec![
        "Revenue growth".to_string(),
        format_percent(fin.growth_and_dividend.revenue_growth),
    ]);
    table.add_row(vec![
        "Dividend yield".to_string(),
        format_percent(fin.growth_and_dividend.dividend_yield),
    ]);
    println!("{}", record.symbol);
    println!("{table}");
}

fn print_persona_menu() {
    for (i, persona) in Persona::ALL.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, persona.label(), persona.description());
    }
}

/// Fetch the session's symbol universe and advance to the data page
async fn run_fetch_stage(
    config: &AdvisorConfig,
    store: &PreferenceStore,
    session: &mut Session,
) -> anyhow::Result<bool> {
    session.favorites = store.favorites().to_vec();
    session.holdings = store.holdings().to_vec();

    let symbols = session.symbols();
    if symbols.is_empty() {
        println!("Add at least one favorite or holding first.");
        return Ok(false);
    }

    println!("Fetching {} symbol(s)...", symbols.len());
    session.begin_run();
    let market = MarketDataClient::new();
    let fundamentals = FundamentalsClient::new(config.request_timeout)?;
    session.records = analysis::build_analysis_set(
        &market,
        &fundamentals,
        config.history_days,
        &symbols,
        &session.favorites,
        &session.holdings,
    )
    .await?;

    if session.records.is_empty() {
        println!("No symbol produced usable data; staying on this page.");
        return Ok(false);
    }
    if session.records.len() < symbols.len() {
        println!(
            "Note: {} symbol(s) were skipped (no data).",
            symbols.len() - session.records.len()
        );
    }
    Ok(true)
}

async fn run_analysis_stage(engine: &AdvisorEngine, session: &mut Session) -> anyhow::Result<()> {
    println!("Running analysis, this can take a while...");
    let analysis = engine.run_analysis(session).await?;
    println!("\n{analysis}\n");
    Ok(())
}

fn parse_holding(args: &[&str]) -> anyhow::Result<Holding> {
    if args.len() != 4 {
        anyhow::bail!("usage: hold add <SYMBOL> <QTY> <PRICE> <YYYY-MM-DD>");
    }
    Ok(Holding {
        symbol: args[0].to_uppercase(),
        quantity: args[1].parse()?,
        price: args[2].parse()?,
        purchase_date: NaiveDate::parse_from_str(args[3], "%Y-%m-%d")?,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "warn,advisor_stock=info".to_string()),
        )
        .init();

    print_banner();

    let config = AdvisorConfig::default().with_env_overrides();
    config.validate()?;

    // The API key is required up front; everything else has defaults.
    let provider = Arc::new(OpenAiProvider::from_env()?);
    let engine = AdvisorEngine::new(provider, config.clone());

    let mut store = PreferenceStore::open(&config.store_path, &config.store_passphrase)?;
    let mut session = Session::new(store.favorites().to_vec(), store.holdings().to_vec());

    println!("Model: {}", config.model);
    println!("Preference store: {}\n", config.store_path.display());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", page_prompt(session.page));
        stdout.flush()?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Global commands work on every page
        match line {
            "exit" | "quit" => {
                println!("Goodbye!");
                break;
            }
            "help" => {
                print_help(session.page);
                continue;
            }
            "reset" => {
                session.goto(Page::SelectStocks)?;
                println!("Back to stock selection.");
                continue;
            }
            _ => {}
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let result = match session.page {
            Page::SelectStocks => {
                handle_select_stocks(&parts, &config, &mut store, &mut session).await
            }
            Page::DataAnalysis => handle_data_analysis(&parts, &mut session),
            Page::SelectInvestor => {
                handle_select_investor(&parts, &engine, &mut session).await
            }
            Page::AiAnalysis => handle_ai_analysis(&parts, &mut session),
            Page::AiChat => handle_ai_chat(line, &engine, &mut session).await,
        };

        if let Err(e) = result {
            eprintln!("Error: {e}\n");
        }
    }

    Ok(())
}

async fn handle_select_stocks(
    parts: &[&str],
    config: &AdvisorConfig,
    store: &mut PreferenceStore,
    session: &mut Session,
) -> anyhow::Result<()> {
    match parts {
        ["list"] => print_preferences(store),
        ["fav", "add", symbol] => {
            if store.add_favorite(symbol.to_uppercase())? {
                println!("Added {}.", symbol.to_uppercase());
            } else {
                println!("{} is already a favorite.", symbol.to_uppercase());
            }
        }
        ["fav", "rm", symbol] => {
            if store.remove_favorite(&symbol.to_uppercase())? {
                println!("Removed {}.", symbol.to_uppercase());
            } else {
                println!("{} is not a favorite.", symbol.to_uppercase());
            }
        }
        ["hold", "add", rest @ ..] => {
            let holding = parse_holding(rest)?;
            let symbol = holding.symbol.clone();
            store.add_holding(holding)?;
            println!("Added holding {symbol}.");
        }
        ["hold", "rm", index] => {
            let removed = store.remove_holding(index.parse()?)?;
            println!("Removed holding {}.", removed.symbol);
        }
        ["next"] => {
            if run_fetch_stage(config, store, session).await? {
                session.goto(Page::DataAnalysis)?;
                print_indicator_table(session);
                println!("Type 'next' to pick an investor persona.");
            }
        }
        _ => println!("Unknown command; type 'help'."),
    }
    Ok(())
}

fn handle_data_analysis(parts: &[&str], session: &mut Session) -> anyhow::Result<()> {
    match parts {
        ["show"] => print_indicator_table(session),
        ["financials", symbol] => {
            let symbol = symbol.to_uppercase();
            match session.records.get(&symbol) {
                Some(record) => print_financials(record),
                None => println!("No data for {symbol}."),
            }
        }
        ["next"] => {
            session.goto(Page::SelectInvestor)?;
            println!("Pick an investor persona:");
            print_persona_menu();
        }
        _ => println!("Unknown command; type 'help'."),
    }
    Ok(())
}

async fn handle_select_investor(
    parts: &[&str],
    engine: &AdvisorEngine,
    session: &mut Session,
) -> anyhow::Result<()> {
    match parts {
        ["list"] => print_persona_menu(),
        ["pick", n] => {
            let choice: usize = n.parse()?;
            let Some(persona) = choice
                .checked_sub(1)
                .and_then(|i| Persona::ALL.get(i).copied())
            else {
                println!("Pick a number between 1 and {}.", Persona::ALL.len());
                return Ok(());
            };
            session.persona = Some(persona);
            session.goto(Page::AiAnalysis)?;
            println!("Persona: {}", persona.label());
            run_analysis_stage(engine, session).await?;
            println!("Type 'chat' to ask follow-up questions, 'rerun' to try another persona.");
        }
        _ => println!("Unknown command; type 'help'."),
    }
    Ok(())
}

fn handle_ai_analysis(parts: &[&str], session: &mut Session) -> anyhow::Result<()> {
    match parts {
        ["show"] => match &session.analysis {
            Some(analysis) => println!("\n{analysis}\n"),
            None => println!("No analysis yet; type 'rerun'."),
        },
        ["chat"] => {
            session.goto(Page::AiChat)?;
            println!("Chat started; type 'back' to return.");
        }
        ["rerun"] => {
            session.goto(Page::SelectInvestor)?;
            print_persona_menu();
        }
        _ => println!("Unknown command; type 'help'."),
    }
    Ok(())
}

async fn handle_ai_chat(
    line: &str,
    engine: &AdvisorEngine,
    session: &mut Session,
) -> anyhow::Result<()> {
    if line == "back" {
        session.goto(Page::AiAnalysis)?;
        println!("Back on the analysis page.");
        return Ok(());
    }
    let reply = engine.chat(session, line).await?;
    println!("\n{reply}\n");
    Ok(())
}
