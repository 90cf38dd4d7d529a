use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The operations the Zencoder CLI exposes over the codec workspace.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Builds a `Partitioner` from a Han-script corpus and saves it as an
    /// opaque blob.
    #[clap(alias = "build")]
    BuildCorpus {
        /// Corpus files to read, in the order their bigrams should chain.
        #[arg(required = true)]
        corpus_files: Vec<PathBuf>,
        /// Where to write the persisted partitioner.
        #[arg(short, long)]
        output: PathBuf,
        /// Number of Huffman trees (`K`).
        #[arg(short = 'k', long, default_value_t = shared_files::config::DEFAULT_TREE_COUNT)]
        tree_count: usize,
    },

    /// Encodes a file's bytes into a sequence of Han characters.
    #[clap(alias = "e")]
    Encode {
        /// Path to a previously built partitioner blob.
        #[arg(short, long)]
        partitioner: PathBuf,
        input_file: PathBuf,
        output_file: PathBuf,
    },

    /// Decodes a file of Han characters back into the original bytes.
    #[clap(alias = "d")]
    Decode {
        #[arg(short, long)]
        partitioner: PathBuf,
        input_file: PathBuf,
        output_file: PathBuf,
    },

    /// Encrypts a file's bytes under an AES-256 key, then encodes the
    /// result into a sequence of Han characters.
    EncodeCipher {
        #[arg(short, long)]
        partitioner: PathBuf,
        /// Path to a file holding exactly 32 raw key bytes.
        #[arg(short, long)]
        key_file: PathBuf,
        input_file: PathBuf,
        output_file: PathBuf,
    },

    /// Decodes a file of Han characters, then decrypts the recovered bytes
    /// under an AES-256 key.
    DecodeCipher {
        #[arg(short, long)]
        partitioner: PathBuf,
        #[arg(short, long)]
        key_file: PathBuf,
        input_file: PathBuf,
        output_file: PathBuf,
    },
}

/// The Zencoder command line utility.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Steganographic text codec: encodes bytes as a stream of CJK characters.",
    long_about = "Builds Huffman/bigram partitioners from a Han-script corpus, then uses them \
                  to encode arbitrary bytes as plausible-looking CJK text and decode them back.",
    after_help = "
    COMMON USAGE:
      First build a partitioner from a corpus, then encode/decode against it.

    EXAMPLES:
    # 1. Build a partitioner with 12 Huffman trees from a corpus directory's files
    zencoder build-corpus corpus/*.txt -o novel.zencoder -k 12

    # 2. Encode a file
    zencoder encode -p novel.zencoder secret.bin secret.txt

    # 3. Decode it back
    zencoder decode -p novel.zencoder secret.txt secret.bin

    # 4. Encrypt-then-encode under a key file
    zencoder encode-cipher -p novel.zencoder -k key.bin secret.bin secret.txt
"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
    /// Enables statistics output (timing, size ratio) after the operation.
    #[arg(short, long)]
    pub stats: bool,
}

/// Errors encountered while validating CLI arguments, separate from the
/// actual encode/decode/build failures surfaced via `anyhow` in `main`.
#[derive(Debug)]
pub enum CliError {
    InputFileNotFound(PathBuf),
    InputNotFile(PathBuf),
    OutputParentDirNotFound(PathBuf),
    OutputParentNotDir(PathBuf),
    ClapError(clap::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InputFileNotFound(p) => write!(f, "input file not found: {}", p.display()),
            CliError::InputNotFile(p) => write!(f, "input path is not a file: {}", p.display()),
            CliError::OutputParentDirNotFound(p) => {
                write!(f, "output directory does not exist: {}", p.display())
            }
            CliError::OutputParentNotDir(p) => {
                write!(f, "output parent is not a directory: {}", p.display())
            }
            CliError::ClapError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<clap::Error> for CliError {
    fn from(error: clap::Error) -> Self {
        CliError::ClapError(error)
    }
}

fn check_input(path: &PathBuf) -> Result<(), CliError> {
    if !path.exists() {
        return Err(CliError::InputFileNotFound(path.clone()));
    }
    if !path.is_file() {
        return Err(CliError::InputNotFile(path.clone()));
    }
    Ok(())
}

fn check_output_parent(path: &PathBuf) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        if !parent.exists() {
            return Err(CliError::OutputParentDirNotFound(parent.to_path_buf()));
        }
        if !parent.is_dir() {
            return Err(CliError::OutputParentNotDir(parent.to_path_buf()));
        }
    }
    Ok(())
}

impl CliArgs {
    /// Checks that every file the chosen subcommand reads exists and every
    /// file it writes has a real parent directory.
    pub fn validate(&self) -> Result<(), CliError> {
        match &self.command {
            Commands::BuildCorpus {
                corpus_files,
                output,
                ..
            } => {
                for file in corpus_files {
                    check_input(file)?;
                }
                check_output_parent(output)
            }
            Commands::Encode {
                partitioner,
                input_file,
                output_file,
            }
            | Commands::Decode {
                partitioner,
                input_file,
                output_file,
            } => {
                check_input(partitioner)?;
                check_input(input_file)?;
                check_output_parent(output_file)
            }
            Commands::EncodeCipher {
                partitioner,
                key_file,
                input_file,
                output_file,
            }
            | Commands::DecodeCipher {
                partitioner,
                key_file,
                input_file,
                output_file,
            } => {
                check_input(partitioner)?;
                check_input(key_file)?;
                check_input(input_file)?;
                check_output_parent(output_file)
            }
        }
    }
}

/// Parses and validates CLI arguments, the entry point `main` calls first.
pub fn parse_args() -> Result<CliArgs, CliError> {
    let args = CliArgs::try_parse()?;
    args.validate()?;
    Ok(args)
}
