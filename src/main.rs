use clap::Parser;
use clap::Subcommand;
use prco::commands::checkout::Checkout;
use prco::git::Git;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "prco")]
#[command(about = "Check out pull requests as local tracking branches", long_about = None)]
struct Cli {
    /// Run as if started in this directory
    #[arg(short = 'C', global = true, default_value = ".")]
    directory: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Checkout(Checkout),
}

fn main() {
    env_logger::init();

    let args = Cli::parse();

    let result = Git::open(&args.directory).and_then(|git| match args.command {
        Commands::Checkout(checkout) => checkout.execute(git),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
