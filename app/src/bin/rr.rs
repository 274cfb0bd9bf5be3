use std::io;
use std::path::PathBuf;

use anyhow::Result;
use structopt::StructOpt;

use rustaurant::config::Config;
use rustaurant::menu::ShowMenu;
use rustaurant::services::Queryable;

#[derive(Debug, StructOpt)]
#[structopt(name = "rr", about = "Rustaurant ordering terminal")]
struct Opt {
    /// Configuration file
    #[structopt(short = "c", long = "config", parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "run", about = "Start an interactive session")]
    Run,
    #[structopt(name = "setup", about = "Create empty collections")]
    Setup,
    #[structopt(name = "show-menu", about = "Show menu")]
    ShowMenu,
    #[structopt(name = "show-orders", about = "Show confirmed orders")]
    ShowOrders {
        /// Only orders placed by this user
        #[structopt(long = "user")]
        user: Option<String>,
    },
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let (config, env_logger) = Config::load(opt.config.as_deref())?;
    env_logger.builder().init();

    let rr = rustaurant::Rustaurant::new(&config);
    let stdout = io::stdout();

    match opt.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let stdin = io::stdin();
            rr.session(stdin.lock(), stdout.lock()).run()?;
        }
        Commands::Setup => {
            rr.setup()?;
        }
        Commands::ShowMenu => {
            let items = rr.menu().query(ShowMenu)?;
            rr.console(io::empty(), stdout.lock()).show_menu(&items)?;
        }
        Commands::ShowOrders { user } => {
            let ledger = rr.ledger()?;
            let mut console = rr.console(io::empty(), stdout.lock());
            match user {
                Some(user) => {
                    console.show_orders(&format!("Orders of {}", user), ledger.for_user(&user), false)?
                }
                None => console.show_orders("All Orders", ledger.orders(), true)?,
            }
        }
    }

    Ok(())
}
