//! Grammar table listing

use anyhow::Result;
use clap::Args;

use cysim_common::{CommandSummary, GrammarTable};

use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct CommandsArgs {
    /// Only list commands that produce output
    #[arg(long)]
    pub implemented: bool,
}

impl TableDisplay for CommandSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Command", "Example", "Implemented", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.to_string(),
            self.example.to_string(),
            if self.implemented { "yes" } else { "no" }.to_string(),
            self.description.to_string(),
        ]
    }
}

pub fn collect(table: &GrammarTable, implemented_only: bool) -> Vec<CommandSummary> {
    table
        .iter()
        .map(|spec| spec.summary())
        .filter(|summary| !implemented_only || summary.implemented)
        .collect()
}

pub async fn execute(args: CommandsArgs, format: OutputFormat) -> Result<()> {
    let commands = collect(GrammarTable::builtin(), args.implemented);
    print_list(&commands, format);
    Ok(())
}
