mod atlas;
mod commands;
mod data;
mod glob;
mod image;
mod options;
mod sprite_name;

use std::process;

use structopt::StructOpt;

use crate::options::{Options, Subcommand};

fn main() {
    env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::from_args();

    match run(options) {
        Ok(_) => {}
        Err(err) => {
            eprintln!("Error: {:?}", err);
            process::exit(1);
        }
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    match options.command {
        Subcommand::Pack(pack_options) => commands::pack(options.global, pack_options)?,
        Subcommand::Layout(layout_options) => commands::layout(options.global, layout_options)?,
    }

    Ok(())
}
