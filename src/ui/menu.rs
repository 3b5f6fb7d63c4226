//! The ten-item interactive menu and the prompt sequences each action needs.
//!
//! Prompts only collect and validate input; all cryptographic and I/O work
//! happens in [`crate::pipeline`], [`crate::embed`], and [`crate::random_io`].
//! This module turns a menu digit into a fully-specified [`Action`] and
//! dispatches it, translating failures into the re-prompt/abort/auth-failure
//! behavior the error-handling design calls for instead of ever panicking.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use inquire::{Confirm, Password, Text};

use crate::cli::CliArgs;
use crate::config::{DEFAULT_ARGON2_TIME_COST, SALT_LEN};
use crate::error::ActionError;
use crate::io_util::{create_exclusive, truncate_and_remove};
use crate::pipeline::{self, Credentials};
use crate::types::Action;
use crate::ui::log::{log_e, log_i, log_w};
use crate::ui::progress::ProgressReporter;
use crate::{embed, random_io};

const MENU: &str = "\
0 Exit
1 Info & warnings
2 Encrypt (new output file)
3 Decrypt (new output file)
4 Embed (overwrite container range)
5 Extract (new output file)
6 Encrypt & embed (overwrite container range)
7 Extract & decrypt (new output file)
8 Create file filled with random bytes
9 Overwrite file range with random bytes";

/// Runs the menu loop until the operator selects "Exit" (0) or a termination
/// signal cuts it short between actions.
pub fn run_menu(cli: &CliArgs) -> Result<()> {
    loop {
        if crate::signal::is_terminated() {
            log_w("terminated by signal");
            return Ok(());
        }

        println!("\n{MENU}\n");
        let Some(choice) = read_digit()? else { continue };

        match choice {
            0 => return Ok(()),
            1 => show_info(),
            2 => dispatch(build_encrypt(), cli),
            3 => dispatch(build_decrypt(), cli),
            4 => dispatch(build_embed(), cli),
            5 => dispatch(build_extract(), cli),
            6 => dispatch(build_encrypt_embed(), cli),
            7 => dispatch(build_extract_decrypt(), cli),
            8 => dispatch(build_create_random(), cli),
            9 => dispatch(build_overwrite_random(), cli),
            _ => unreachable!("read_digit only returns 0-9"),
        }
    }
}

/// Builds an [`Action`] from its prompt sequence, then executes it. Every
/// failure — a canceled prompt, a bad path, a MAC mismatch — is reported and
/// returns control to the menu rather than propagating out of the loop.
fn dispatch(action: Result<Action>, cli: &CliArgs) {
    let result = action.and_then(|action| execute(action, cli));
    if let Err(err) = result {
        log_e(&format!("{err:#}"));
    }
}

fn read_digit() -> Result<Option<u8>> {
    print!("> ");
    io::stdout().flush().ok();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).context("failed to read menu choice")? == 0 {
        return Ok(Some(0));
    }
    match line.trim().parse::<u8>() {
        Ok(d) if d <= 9 => Ok(Some(d)),
        _ => {
            log_e(&format!("invalid menu choice {:?}, expected a digit 0-9", line.trim()));
            Ok(None)
        }
    }
}

fn show_info() {
    log_i("purbox produces PURB-style cryptoblobs: authenticated ciphertexts indistinguishable from uniform random bytes, leaking only their total length.");
    log_w("secret material is scrubbed from memory on a best-effort basis only; this tool does not protect against a compromised runtime.");
    log_w("the binary cryptoblob format carries no stability guarantee across releases.");
}

fn prompt_existing_path(message: &str) -> Result<PathBuf> {
    loop {
        let input = Text::new(message).prompt().context("failed to read path")?;
        let path = PathBuf::from(input);
        if path.exists() {
            return Ok(path);
        }
        log_e(&ActionError::InputNotFound(path.display().to_string()).to_string());
    }
}

fn prompt_output_path(message: &str) -> Result<PathBuf> {
    Text::new(message).prompt().map(PathBuf::from).context("failed to read path")
}

fn prompt_comments(default: &str) -> Result<String> {
    Text::new("Comments:").with_default(default).prompt().context("failed to read comments")
}

fn prompt_keyfiles() -> Result<Vec<PathBuf>> {
    let mut keyfiles = Vec::new();
    loop {
        let input = Text::new("Keyfile path (empty to finish):").prompt().context("failed to read keyfile path")?;
        if input.trim().is_empty() {
            return Ok(keyfiles);
        }
        let path = PathBuf::from(input.trim());
        if path.exists() {
            keyfiles.push(path);
        } else {
            log_e(&ActionError::InputNotFound(path.display().to_string()).to_string());
        }
    }
}

fn prompt_passphrase() -> Result<String> {
    Password::new("Passphrase:").prompt().context("failed to read passphrase")
}

fn prompt_time_cost() -> Result<u32> {
    let input = Text::new("Argon2 time cost:").with_default(&DEFAULT_ARGON2_TIME_COST.to_string()).prompt().context("failed to read time cost")?;
    input.trim().parse::<u32>().context("time cost must be a non-negative integer")
}

fn prompt_u64(message: &str) -> Result<u64> {
    let input = Text::new(message).prompt().context("failed to read value")?;
    input.trim().parse::<u64>().context("expected a non-negative integer")
}

fn confirm(message: &str, default: bool) -> Result<bool> {
    Confirm::new(message).with_default(default).prompt().context("failed to read confirmation")
}

fn build_encrypt() -> Result<Action> {
    let input = prompt_existing_path("Input file:")?;
    let comments = prompt_comments(&default_comment(&input))?;
    let output = prompt_output_path("Output file:")?;
    let keyfiles = prompt_keyfiles()?;
    let passphrase = prompt_passphrase()?;
    let time_cost = prompt_time_cost()?;
    Ok(Action::Encrypt { input, output, comments, keyfiles, passphrase, time_cost })
}

fn build_decrypt() -> Result<Action> {
    let input = prompt_existing_path("Input file:")?;
    let output = prompt_output_path("Output file:")?;
    let keyfiles = prompt_keyfiles()?;
    let passphrase = prompt_passphrase()?;
    let time_cost = prompt_time_cost()?;
    Ok(Action::Decrypt { input, output, keyfiles, passphrase, time_cost })
}

fn build_embed() -> Result<Action> {
    let input = prompt_existing_path("Input file (cryptoblob):")?;
    let container = prompt_existing_path("Container file:")?;
    let start_pos = prompt_u64("Start position:")?;
    Ok(Action::Embed { input, container, start_pos })
}

fn build_extract() -> Result<Action> {
    let container = prompt_existing_path("Container file:")?;
    let output = prompt_output_path("Output file:")?;
    let start_pos = prompt_u64("Start position:")?;
    let end_pos = prompt_u64("End position:")?;
    Ok(Action::Extract { container, output, start_pos, end_pos })
}

fn build_encrypt_embed() -> Result<Action> {
    let input = prompt_existing_path("Input file:")?;
    let container = prompt_existing_path("Container file:")?;
    let start_pos = prompt_u64("Start position:")?;
    let comments = prompt_comments(&default_comment(&input))?;
    let keyfiles = prompt_keyfiles()?;
    let passphrase = prompt_passphrase()?;
    let time_cost = prompt_time_cost()?;
    Ok(Action::EncryptEmbed { input, container, start_pos, comments, keyfiles, passphrase, time_cost })
}

fn build_extract_decrypt() -> Result<Action> {
    let container = prompt_existing_path("Container file:")?;
    let output = prompt_output_path("Output file:")?;
    let start_pos = prompt_u64("Start position:")?;
    let end_pos = prompt_u64("End position:")?;
    let keyfiles = prompt_keyfiles()?;
    let passphrase = prompt_passphrase()?;
    let time_cost = prompt_time_cost()?;
    Ok(Action::ExtractDecrypt { container, output, start_pos, end_pos, keyfiles, passphrase, time_cost })
}

fn build_create_random() -> Result<Action> {
    let output = prompt_output_path("Output file:")?;
    let size = prompt_u64("Size in bytes:")?;
    Ok(Action::CreateRandom { output, size })
}

fn build_overwrite_random() -> Result<Action> {
    let path = prompt_existing_path("File to overwrite:")?;
    let start_pos = prompt_u64("Start position:")?;
    let end_pos = prompt_u64("End position:")?;
    Ok(Action::OverwriteRandom { path, start_pos, end_pos })
}

fn default_comment(input: &Path) -> String {
    input.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

fn execute(action: Action, cli: &CliArgs) -> Result<()> {
    match action {
        Action::Encrypt { input, output, comments, keyfiles, passphrase, time_cost } => do_encrypt(&input, &output, &comments, &keyfiles, &passphrase, time_cost),
        Action::Decrypt { input, output, keyfiles, passphrase, time_cost } => do_decrypt(&input, &output, &keyfiles, &passphrase, time_cost, cli.unsafe_decrypt),
        Action::Embed { input, container, start_pos } => do_embed(&input, &container, start_pos),
        Action::Extract { container, output, start_pos, end_pos } => do_extract(&container, &output, start_pos, end_pos),
        Action::EncryptEmbed { input, container, start_pos, comments, keyfiles, passphrase, time_cost } => do_encrypt_embed(&input, &container, start_pos, &comments, &keyfiles, &passphrase, time_cost),
        Action::ExtractDecrypt { container, output, start_pos, end_pos, keyfiles, passphrase, time_cost } => do_extract_decrypt(&container, &output, start_pos, end_pos, &keyfiles, &passphrase, time_cost, cli.unsafe_decrypt),
        Action::CreateRandom { output, size } => do_create_random(&output, size),
        Action::OverwriteRandom { path, start_pos, end_pos } => do_overwrite_random(&path, start_pos, end_pos),
    }
}

/// Opens `path` fresh, asking to overwrite (and removing) if it already
/// exists. `Ok(None)` means the operator declined and the action should be
/// abandoned quietly.
fn open_output(path: &Path) -> Result<Option<File>> {
    if path.exists() {
        if !confirm(&format!("{} already exists, overwrite?", path.display()), false)? {
            log_i("operation canceled");
            return Ok(None);
        }
        std::fs::remove_file(path).with_context(|| format!("failed to remove existing {}", path.display()))?;
    }
    let file = create_exclusive(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Some(file))
}

/// Cleans up a freshly created output file after a failed action: truncate,
/// then remove on confirmation (defaulting to yes).
fn cleanup_partial(file: File, path: &Path) -> Result<()> {
    let remove = confirm(&format!("remove partial output {}?", path.display()), true).unwrap_or(true);
    truncate_and_remove(file, path, remove)
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn do_encrypt(input_path: &Path, output_path: &Path, comments: &str, keyfiles: &[PathBuf], passphrase: &str, time_cost: u32) -> Result<()> {
    pipeline::validate_keyfiles(keyfiles)?;
    let mut input = File::open(input_path).with_context(|| format!("failed to open {}", input_path.display()))?;
    let input_size = input.metadata()?.len();

    let Some(mut output) = open_output(output_path)? else { return Ok(()) };

    let creds = Credentials { keyfile_paths: keyfiles, passphrase: Some(passphrase), time_cost };
    let mut progress = ProgressReporter::new(input_size, "Encrypting");
    match pipeline::encrypt(&mut input, input_size, comments, &mut output, &creds, &mut progress) {
        Ok(padded_size) => {
            progress.finish();
            log_i(&format!("wrote {padded_size} bytes to {}", output_path.display()));
            Ok(())
        }
        Err(err) => {
            cleanup_partial(output, output_path)?;
            Err(err)
        }
    }
}

fn do_decrypt(input_path: &Path, output_path: &Path, keyfiles: &[PathBuf], passphrase: &str, time_cost: u32, unsafe_decrypt: bool) -> Result<()> {
    pipeline::validate_keyfiles(keyfiles)?;
    let mut input = File::open(input_path).with_context(|| format!("failed to open {}", input_path.display()))?;
    let padded_size = input.metadata()?.len();

    if padded_size < SALT_LEN as u64 {
        return Err(ActionError::SizeValidation.into());
    }
    let mut blake2_salt = [0u8; SALT_LEN];
    input.seek(SeekFrom::End(-(SALT_LEN as i64))).map_err(|e| ActionError::SeekError(e.to_string()))?;
    input.read_exact(&mut blake2_salt).map_err(|e| ActionError::ReadError(e.to_string()))?;
    input.seek(SeekFrom::Start(0)).map_err(|e| ActionError::SeekError(e.to_string()))?;

    let Some(mut output) = open_output(output_path)? else { return Ok(()) };

    let creds = Credentials { keyfile_paths: keyfiles, passphrase: Some(passphrase), time_cost };
    let mut progress = ProgressReporter::new(padded_size, "Decrypting");
    match pipeline::decrypt(&mut input, padded_size, blake2_salt, &mut output, &creds, unsafe_decrypt, &mut progress) {
        Ok(outcome) => {
            progress.finish();
            log_i(&format!("comments: {}", outcome.comments));
            Ok(())
        }
        Err(err) => {
            cleanup_partial(output, output_path)?;
            Err(err.into())
        }
    }
}

fn do_embed(input_path: &Path, container_path: &Path, start_pos: u64) -> Result<()> {
    let mut input = File::open(input_path).with_context(|| format!("failed to open {}", input_path.display()))?;
    let input_size = input.metadata()?.len();
    let mut container = File::options().read(true).write(true).open(container_path).with_context(|| format!("failed to open {}", container_path.display()))?;

    let mut progress = ProgressReporter::new(input_size, "Embedding");
    let report = embed::embed(&mut input, input_size, &mut container, start_pos, &mut progress)?;
    progress.finish();
    log_i(&format!("embedded [{}, {}) checksum {}", report.start_pos, report.end_pos, hex(&report.checksum)));
    Ok(())
}

fn do_extract(container_path: &Path, output_path: &Path, start_pos: u64, end_pos: u64) -> Result<()> {
    let mut container = File::open(container_path).with_context(|| format!("failed to open {}", container_path.display()))?;
    let Some(mut output) = open_output(output_path)? else { return Ok(()) };

    let mut progress = ProgressReporter::new(end_pos.saturating_sub(start_pos), "Extracting");
    match embed::extract(&mut container, start_pos, end_pos, &mut output, &mut progress) {
        Ok(report) => {
            progress.finish();
            log_i(&format!("extracted [{}, {}) checksum {}", report.start_pos, report.end_pos, hex(&report.checksum)));
            Ok(())
        }
        Err(err) => {
            cleanup_partial(output, output_path)?;
            Err(err)
        }
    }
}

fn do_encrypt_embed(input_path: &Path, container_path: &Path, start_pos: u64, comments: &str, keyfiles: &[PathBuf], passphrase: &str, time_cost: u32) -> Result<()> {
    pipeline::validate_keyfiles(keyfiles)?;
    let mut input = File::open(input_path).with_context(|| format!("failed to open {}", input_path.display()))?;
    let input_size = input.metadata()?.len();
    let creds = Credentials { keyfile_paths: keyfiles, passphrase: Some(passphrase), time_cost };

    let mut cryptoblob = Vec::new();
    let mut encrypt_progress = ProgressReporter::new(input_size, "Encrypting");
    let padded_size = pipeline::encrypt(&mut input, input_size, comments, &mut Cursor::new(&mut cryptoblob), &creds, &mut encrypt_progress)?;
    encrypt_progress.finish();

    let mut container = File::options().read(true).write(true).open(container_path).with_context(|| format!("failed to open {}", container_path.display()))?;
    let mut embed_progress = ProgressReporter::new(padded_size, "Embedding");
    let report = embed::embed(&mut Cursor::new(&cryptoblob), padded_size, &mut container, start_pos, &mut embed_progress)?;
    embed_progress.finish();
    log_i(&format!("embedded cryptoblob [{}, {}) checksum {}", report.start_pos, report.end_pos, hex(&report.checksum)));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn do_extract_decrypt(container_path: &Path, output_path: &Path, start_pos: u64, end_pos: u64, keyfiles: &[PathBuf], passphrase: &str, time_cost: u32, unsafe_decrypt: bool) -> Result<()> {
    pipeline::validate_keyfiles(keyfiles)?;
    anyhow::ensure!(start_pos <= end_pos, "start position {start_pos} is after end position {end_pos}");
    let padded_size = end_pos - start_pos;

    let mut container = File::open(container_path).with_context(|| format!("failed to open {}", container_path.display()))?;
    let mut cryptoblob = Vec::new();
    let mut extract_progress = ProgressReporter::new(padded_size, "Extracting");
    embed::extract(&mut container, start_pos, end_pos, &mut Cursor::new(&mut cryptoblob), &mut extract_progress)?;
    extract_progress.finish();

    if (cryptoblob.len() as u64) < SALT_LEN as u64 {
        return Err(ActionError::SizeValidation.into());
    }
    let split = cryptoblob.len() - SALT_LEN;
    let blake2_salt: [u8; SALT_LEN] = cryptoblob[split..].try_into().expect("split leaves exactly SALT_LEN bytes");
    let body = cryptoblob[..split].to_vec();

    let Some(mut output) = open_output(output_path)? else { return Ok(()) };
    let creds = Credentials { keyfile_paths: keyfiles, passphrase: Some(passphrase), time_cost };
    let mut decrypt_progress = ProgressReporter::new(padded_size, "Decrypting");
    match pipeline::decrypt(&mut Cursor::new(body), padded_size, blake2_salt, &mut output, &creds, unsafe_decrypt, &mut decrypt_progress) {
        Ok(outcome) => {
            decrypt_progress.finish();
            log_i(&format!("comments: {}", outcome.comments));
            Ok(())
        }
        Err(err) => {
            cleanup_partial(output, output_path)?;
            Err(err.into())
        }
    }
}

fn do_create_random(output_path: &Path, size: u64) -> Result<()> {
    let Some(mut output) = open_output(output_path)? else { return Ok(()) };
    let mut progress = ProgressReporter::new(size, "Writing random bytes");
    match random_io::write_random(&mut output, size, &mut progress) {
        Ok(()) => {
            progress.finish();
            log_i(&format!("wrote {size} random bytes to {}", output_path.display()));
            Ok(())
        }
        Err(err) => {
            cleanup_partial(output, output_path)?;
            Err(err)
        }
    }
}

fn do_overwrite_random(path: &Path, start_pos: u64, end_pos: u64) -> Result<()> {
    anyhow::ensure!(start_pos <= end_pos, "start position {start_pos} is after end position {end_pos}");
    let mut file = File::options().read(true).write(true).open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let file_len = file.metadata()?.len();
    anyhow::ensure!(end_pos <= file_len, "end position {end_pos} exceeds file size {file_len}");

    file.seek(SeekFrom::Start(start_pos)).map_err(|e| ActionError::SeekError(e.to_string()))?;
    let mut progress = ProgressReporter::new(end_pos - start_pos, "Overwriting with random bytes");
    random_io::write_random(&mut file, end_pos - start_pos, &mut progress)?;
    file.sync_all().map_err(|e| ActionError::FsyncError(e.to_string()))?;
    progress.finish();
    log_i(&format!("overwrote [{start_pos}, {end_pos}) of {}", path.display()));
    Ok(())
}
