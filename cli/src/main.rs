mod commands;
mod terminal;

use commands::{CommandLine, Commands, ping, scan};
use lanscout_common::config::ScanMode;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init()?;
    let q_level = commands.quiet;
    print::banner(q_level);

    let args = &commands.scan;
    let outcome = match commands.command {
        Commands::Quick => {
            print::header("getting ready for a quick scan", q_level);
            scan::scan(ScanMode::Quick, args, false, q_level).await
        }
        Commands::Local => {
            print::header("getting ready for a local scan", q_level);
            scan::local(args, q_level).await
        }
        Commands::Sweep { yes } => {
            print::header("getting ready for a full sweep", q_level);
            scan::scan(ScanMode::FullSweep, args, yes, q_level).await
        }
        Commands::Manual { target } => {
            print::header("getting ready for discovery", q_level);
            scan::scan(ScanMode::Manual(target), args, false, q_level).await
        }
        Commands::Ping { host, count } => ping::ping(host, count, args, q_level).await,
    };

    print::end_of_program();
    outcome
}
