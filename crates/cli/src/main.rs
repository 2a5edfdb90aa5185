//! Entry point for the command-line interface.
//! Delegates to dedicated modules for argument handling, fix
//! application, inspection and rule listing.

use clap::Parser;

use remedium::args::{Cli, Commands, RulesCmd};
use remedium::fix::run_fix;
use remedium::inspect::run_inspect;
use remedium::rules::{inspect_rule, list_rules};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Fix(args) => run_fix(args),
        Commands::Inspect(args) => run_inspect(args),
        Commands::Rules(RulesCmd::List) => list_rules(),
        Commands::Rules(RulesCmd::Inspect { id }) => inspect_rule(&id),
    }
}
