//! Data transformation commands.

use std::fs;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::{Map, Value};

use crate::batch::batchify;
use crate::case::camel_to_snake;
use crate::flatten::{flatten_dict, FlattenOptions, DEFAULT_SEPARATOR};

/// Batch command options.
#[derive(Parser)]
pub struct BatchCommand {
    /// Number of items per batch.
    #[arg(short, long, default_value_t = NonZeroUsize::MIN)]
    pub size: NonZeroUsize,

    /// Items to split, in order.
    pub items: Vec<String>,
}

impl BatchCommand {
    /// Prints one batch per line, items separated by spaces.
    pub fn execute(self) -> Result<()> {
        for batch in batchify(&self.items, self.size.get())? {
            println!("{}", batch.join(" "));
        }
        Ok(())
    }
}

/// Snake command options.
#[derive(Parser)]
pub struct SnakeCommand {
    /// camelCase or PascalCase names to convert.
    #[arg(required = true)]
    pub names: Vec<String>,
}

impl SnakeCommand {
    /// Prints each converted name on its own line.
    pub fn execute(self) -> Result<()> {
        for name in &self.names {
            println!("{}", camel_to_snake(name));
        }
        Ok(())
    }
}

/// Flatten command options.
#[derive(Parser)]
pub struct FlattenCommand {
    /// JSON file to read; stdin when omitted.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Prefix applied to every flattened key.
    #[arg(long, default_value = "")]
    pub parent_key: String,

    /// Separator placed between key segments.
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    pub sep: String,

    /// Pretty-prints the output.
    #[arg(long)]
    pub pretty: bool,
}

impl FlattenCommand {
    /// Prints the flattened object as JSON.
    pub fn execute(self) -> Result<()> {
        let input = match &self.file {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read JSON from stdin")?;
                buffer
            }
        };

        let flat = self.flatten_str(&input)?;
        let output = if self.pretty {
            serde_json::to_string_pretty(&flat)?
        } else {
            serde_json::to_string(&flat)?
        };
        println!("{output}");
        Ok(())
    }

    fn flatten_str(&self, input: &str) -> Result<Map<String, Value>> {
        let value: Value = serde_json::from_str(input).context("Input is not valid JSON")?;
        let Value::Object(map) = value else {
            bail!("Input must be a JSON object");
        };
        let options = FlattenOptions::default()
            .with_parent_key(self.parent_key.as_str())
            .with_separator(self.sep.as_str());
        Ok(flatten_dict(&map, &options))
    }
}
