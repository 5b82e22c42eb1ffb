mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The library and the binary both log under the `spritesheet` target
    let default_filter = if cli.verbose {
        "spritesheet=debug"
    } else {
        "spritesheet=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Export {
            input,
            requirements,
            output,
            sprite_size,
        } => {
            let input = config.sprite_sheet_bin(input);
            let requirements = config.requirements(requirements);
            let output = output.unwrap_or_else(|| {
                config
                    .output_dir(None)
                    .join(spritesheet::DEFAULT_EXPORT_FILE)
            });
            commands::export::handle(&input, &requirements, &output, sprite_size)?;
        }

        Commands::Pack {
            input,
            out_dir,
            basename,
            max_size,
            padding,
            background,
            single_sheet,
            recursive,
        } => {
            let opts = spritesheet::PackOptions {
                basename,
                max_size,
                padding,
                background,
                single_sheet,
                recursive,
            };
            commands::pack::handle(&input, &config.output_dir(out_dir), &opts)?;
        }

        Commands::Extract {
            json,
            sheet_image,
            output,
            sheet,
        } => {
            commands::extract::handle(&json, &sheet_image, &output, sheet.as_deref())?;
        }

        Commands::Stats { input, json } => {
            commands::stats::handle(&input, json)?;
        }

        Commands::Configure {
            sprite_sheet_bin,
            requirements,
            output_dir,
            show,
        } => {
            commands::configure::handle(config, sprite_sheet_bin, requirements, output_dir, show)?;
        }
    }

    Ok(())
}
