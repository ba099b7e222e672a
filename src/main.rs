use std::{path::PathBuf, process::ExitCode};
use clap::Parser;
use log::error;
use shared::BufferPool;
use tr_repack::{
	load_level,
	options::{DEFAULT_PANEL_PAGES, MAX_PANEL_PAGES},
	LoadEnv, RepackOptions,
};

#[derive(Parser, Debug)]
#[command(name = "tr_repack", about = "Repack the used textures of a level into a compact atlas", version)]
struct Cli {
	/// Level file (.phd, .tr2, .tr4, .trc, .ten)
	level: PathBuf,
	/// Output width in 256 texel pages
	#[arg(
		long,
		default_value_t = DEFAULT_PANEL_PAGES,
		value_parser = clap::value_parser!(u32).range(1..=MAX_PANEL_PAGES as i64),
	)]
	pages: u32,
	/// Lay source pages out whole instead of packing used tiles
	#[arg(long)]
	no_repack: bool,
}

fn main() -> ExitCode {
	env_logger::init();
	let cli = Cli::parse();
	let options = RepackOptions { panel_pages: cli.pages, repack: !cli.no_repack };
	let pool = BufferPool::new();
	let env = LoadEnv::new(&pool);
	match load_level(&cli.level, &options, &env) {
		Ok(atlas) => {
			println!("width: {}", atlas.width);
			println!("height: {}", atlas.height);
			println!("bytes per pixel: {}", atlas.bytes_per_pixel);
			println!("tiles: {}", atlas.placements.len());
			println!("space sufficient: {}", atlas.space_sufficient);
			ExitCode::SUCCESS
		},
		Err(err) => {
			error!("{}: {}", cli.level.display(), err);
			eprintln!("error: {}", err);
			ExitCode::FAILURE
		},
	}
}
