use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use notifcal::cli::{Cli, Commands, render_table};
use notifcal::config::Config;
use notifcal::context::StandardContext;
use notifcal::controller::Harvester;
use notifcal::export::to_ics_string;
use notifcal::source::SnapshotSource;
use notifcal::storage::LocalStorage;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    if let Err(e) = run(cli) {
        log::error!("Run failed: {:#}", e);
        println!("STATUS=FAIL");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = StandardContext::new(cli.root);
    let config = Config::load(&ctx)?.with_env_overrides();
    log::debug!("Timezone={} | target phrase='{}'", config.timezone, config.target_phrase);

    match cli.command {
        Commands::Ingest { input } => {
            let today = config.reference_date(Utc::now());
            let harvester = Harvester::new(&ctx, config);
            let mut source = SnapshotSource::new(input);
            let report = harvester.run(&mut source, today)?;
            log::info!(
                "Matched {} notifications ({} with details), {} new, {} stored",
                report.matched,
                report.with_detail,
                report.added,
                report.total
            );
            println!("STATUS={}", report.status);
        }
        Commands::Export => {
            let (json_path, _) = config.output_paths(&ctx)?;
            let tz = config
                .tz()
                .ok_or_else(|| anyhow::anyhow!("Unknown timezone '{}'", config.timezone))?;
            let records = LocalStorage::load_events(&json_path);
            println!("{}", to_ics_string(&records, tz));
        }
        Commands::Show => {
            let (json_path, _) = config.output_paths(&ctx)?;
            print!("{}", render_table(&LocalStorage::load_events(&json_path)));
        }
    }
    Ok(())
}
