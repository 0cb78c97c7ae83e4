use crate::cli::ElementsArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use rutherford::core::elements::{self, Element};

pub fn run(args: ElementsArgs) -> Result<()> {
    match args.symbol {
        Some(symbol) => {
            let element =
                parser::parse_element(&symbol).map_err(|e| CliError::Argument(e.to_string()))?;
            println!("{}", header());
            println!("{}", format_row(element));
        }
        None => {
            println!("{}", header());
            for element in elements::all() {
                println!("{}", format_row(element));
            }
        }
    }
    Ok(())
}

fn header() -> String {
    format!("{:<6} {:<10} {:>7} {:>8}", "Symbol", "Name", "Protons", "Neutrons")
}

fn format_row(element: &Element) -> String {
    format!(
        "{:<6} {:<10} {:>7} {:>8}",
        element.symbol, element.name, element.protons, element.neutrons
    )
}
