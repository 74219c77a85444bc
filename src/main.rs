mod cli;
mod commands;
mod config;
mod logger;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use crate::{cli::Cli, config::ToolConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ToolConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logger::init_logger("info");
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    logger::init_logger(cli.log_level.as_deref().unwrap_or(&config.log_level));

    match commands::run(cli.command, &config).context("命令执行失败") {
        Ok(Some(report)) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
