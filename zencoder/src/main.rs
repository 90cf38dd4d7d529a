mod cli_parse;

use std::fs;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use cli_parse::{CliError, Commands};
use rand::rngs::ThreadRng;
use shared_files::stats::{CompressionStatsBuilder, OptinalStatsTimer};

fn read_key(path: &std::path::Path) -> Result<[u8; 32]> {
    let bytes = fs::read(path).with_context(|| format!("reading key file {}", path.display()))?;
    if bytes.len() != 32 {
        bail!(
            "key file {} holds {} bytes, expected exactly 32",
            path.display(),
            bytes.len()
        );
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(key)
}

fn report(
    stats_enabled: bool,
    algorithm_name: &'static str,
    is_compression: bool,
    original_len: usize,
    processed_len: usize,
    duration: std::time::Duration,
) {
    if !stats_enabled {
        return;
    }
    match CompressionStatsBuilder::new()
        .algorithm_name(algorithm_name)
        .algorithm_id(0)
        .version_used(1)
        .original_len(original_len)
        .processed_len(processed_len)
        .duration(duration)
        .is_compression(is_compression)
        .build()
    {
        Ok(stats) => println!("{stats}"),
        Err(e) => log::warn!("could not assemble stats report: {e}"),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = match cli_parse::parse_args() {
        Ok(args) => args,
        Err(CliError::ClapError(e)) => e.exit(),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut rng: ThreadRng = rand::rng();
    let mut timer = OptinalStatsTimer::new(args.stats);

    match args.command {
        Commands::BuildCorpus {
            corpus_files,
            output,
            tree_count,
        } => {
            let section = timer.start_section("corpus ingestion");
            let graph = wordgraph_module::WordGraph::from_corpus(&corpus_files)
                .context("reading corpus into a word graph")?;
            timer.add_section(section);

            let section = timer.start_section("partitioner construction");
            let partitioner = partitioner_module::Partitioner::build(graph, tree_count, &mut rng)
                .context("building partitioner from word graph")?;
            timer.add_section(section);

            codec_module::save_partitioner(&partitioner, &output).context("saving partitioner")?;

            let (duration, _sections) = timer.end();
            report(
                args.stats,
                "Zencoder corpus build",
                true,
                corpus_files.len(),
                output.metadata().map(|m| m.len() as usize).unwrap_or(0),
                duration,
            );
            log::info!(
                "built partitioner with {tree_count} trees, wrote {}",
                output.display()
            );
        }

        Commands::Encode {
            partitioner,
            input_file,
            output_file,
        } => {
            let started = Instant::now();
            let partitioner = codec_module::load_partitioner(&partitioner)
                .context("loading partitioner")?;
            let bytes = fs::read(&input_file)
                .with_context(|| format!("reading {}", input_file.display()))?;

            let text = codec_module::encode_plain(&partitioner, &bytes, &mut rng);
            fs::write(&output_file, &text)
                .with_context(|| format!("writing {}", output_file.display()))?;

            report(
                args.stats,
                "Zencoder encode",
                true,
                bytes.len(),
                text.len(),
                started.elapsed(),
            );
        }

        Commands::Decode {
            partitioner,
            input_file,
            output_file,
        } => {
            let started = Instant::now();
            let partitioner = codec_module::load_partitioner(&partitioner)
                .context("loading partitioner")?;
            let text = fs::read_to_string(&input_file)
                .with_context(|| format!("reading {}", input_file.display()))?;

            let Some(bytes) = codec_module::decode_plain(&partitioner, &text) else {
                bail!(
                    "{} contains a character outside the partitioner's vocabulary",
                    input_file.display()
                );
            };
            fs::write(&output_file, &bytes)
                .with_context(|| format!("writing {}", output_file.display()))?;

            report(
                args.stats,
                "Zencoder decode",
                false,
                text.len(),
                bytes.len(),
                started.elapsed(),
            );
        }

        Commands::EncodeCipher {
            partitioner,
            key_file,
            input_file,
            output_file,
        } => {
            let started = Instant::now();
            let key = read_key(&key_file)?;
            let partitioner = codec_module::load_partitioner(&partitioner)
                .context("loading partitioner")?;
            let bytes = fs::read(&input_file)
                .with_context(|| format!("reading {}", input_file.display()))?;

            let text = codec_module::encode_cipher(&partitioner, &bytes, &key, &mut rng);
            fs::write(&output_file, &text)
                .with_context(|| format!("writing {}", output_file.display()))?;

            report(
                args.stats,
                "Zencoder encode-cipher",
                true,
                bytes.len(),
                text.len(),
                started.elapsed(),
            );
        }

        Commands::DecodeCipher {
            partitioner,
            key_file,
            input_file,
            output_file,
        } => {
            let started = Instant::now();
            let key = read_key(&key_file)?;
            let partitioner = codec_module::load_partitioner(&partitioner)
                .context("loading partitioner")?;
            let text = fs::read_to_string(&input_file)
                .with_context(|| format!("reading {}", input_file.display()))?;

            let Some(bytes) = codec_module::decode_cipher(&partitioner, &text, &key) else {
                bail!(
                    "{} failed to decode or decrypt under the given key",
                    input_file.display()
                );
            };
            fs::write(&output_file, &bytes)
                .with_context(|| format!("writing {}", output_file.display()))?;

            report(
                args.stats,
                "Zencoder decode-cipher",
                false,
                text.len(),
                bytes.len(),
                started.elapsed(),
            );
        }
    }

    Ok(())
}
