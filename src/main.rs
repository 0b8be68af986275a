use anyhow::{Context, Result};
use log::{info, warn};
use mongo_find_sql::config::{TranslatorConfig, DEFAULT_CONFIG_FILE};
use mongo_find_sql::Translator;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

const RENAME_ID_FLAG: &str = "--rename-id";

/// Loads the config file, falling back to defaults when it is absent
fn load_config() -> Result<TranslatorConfig> {
    if !Path::new(DEFAULT_CONFIG_FILE).exists() {
        return Ok(TranslatorConfig::default());
    }
    let config = TranslatorConfig::from_json_file(DEFAULT_CONFIG_FILE)
        .with_context(|| format!("loading {}", DEFAULT_CONFIG_FILE))?;
    info!("Loaded configuration from {}", DEFAULT_CONFIG_FILE);
    Ok(config)
}

fn print_translation(translator: &Translator, query: &str) {
    match translator.try_translate(query) {
        Ok(sql) => println!("{}", sql),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn run_repl(mut translator: Translator, config: &TranslatorConfig) -> Result<()> {
    let mut editor = DefaultEditor::new().context("starting line editor")?;
    if let Some(history) = &config.history_file {
        if editor.load_history(history).is_err() {
            info!("No previous history at {}", history.display());
        }
    }

    println!("--- MongoDB find → SQL ---");
    println!("Enter a db.<collection>.find(...) invocation. `:id` toggles _id → id, `:quit` exits.");

    loop {
        match editor.readline("mongo> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;

                match line {
                    ":quit" | ":q" => break,
                    ":id" => {
                        translator = Translator::new(!translator.rename_id());
                        println!("_id → id renaming {}", if translator.rename_id() { "on" } else { "off" });
                    }
                    query => print_translation(&translator, query),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("reading input"),
        }
    }

    if let Some(history) = &config.history_file {
        if let Err(e) = editor.save_history(history) {
            warn!("Could not save history to {}: {}", history.display(), e);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut config = load_config()?;
    let mut queries = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == RENAME_ID_FLAG {
            config.rename_id = true;
        } else {
            queries.push(arg);
        }
    }

    let translator = Translator::from_config(&config);
    if queries.is_empty() {
        return run_repl(translator, &config);
    }

    for query in &queries {
        print_translation(&translator, query);
    }
    Ok(())
}
