//! Terminal scan client.
//!
//! Each line on stdin stands for one decoded camera frame; blank lines are
//! frames with nothing readable in them.

use std::io::Write;

use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;
use url::Url;

use scanner::{
    Camera, CameraError, HttpKehadiranApi, IdentitySelector, KehadiranApi, MIN_QUERY_CHARS,
    ScanFlow, ScanState, ScannerConfig, SearchOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "kehadiran-scan", about = "Catat kehadiran jemaat lewat QR Code")]
struct Args {
    /// Base URL of the kehadiran API, e.g. http://127.0.0.1:3000/api
    #[arg(long, env = "KEHADIRAN_API_URL")]
    api_url: Option<Url>,

    /// Initial jemaat search
    #[arg(long)]
    search: Option<String>,
}

/// Stands in for the camera: stdin is always readable, so starting and
/// clearing only report the state to the operator.
struct ConsoleCamera;

impl Camera for ConsoleCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        println!("{}", "● Kamera aktif".dimmed());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CameraError> {
        println!("{}", "○ Kamera dimatikan".dimmed());
        Ok(())
    }
}

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scanner=warn")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ScannerConfig::from_env();
    if let Some(url) = args.api_url {
        config = config.with_api_url(url);
    }
    let api = HttpKehadiranApi::new(&config)?;
    println!("{} {}", "API:".bold(), api.base_url());

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let mut selector = IdentitySelector::new();
    if !choose_jemaat(&api, &mut selector, &mut input, args.search).await? {
        return Ok(());
    }

    let mut flow = ScanFlow::mount(ConsoleCamera, selector.selected().cloned())?;
    if let Some(j) = flow.identity() {
        println!("Mencatat kehadiran untuk {} ({})", j.nama.bold(), j.nomor_induk);
    }

    loop {
        prompt("QR Code");
        let Some(line) = input.next_line().await? else {
            break;
        };

        flow.handle_decode(&api, &line).await;

        match flow.state() {
            ScanState::Success { message } => render_panel(true, message),
            ScanState::Error { message } => render_panel(false, message),
            ScanState::Scanning | ScanState::Submitting => continue,
        }

        prompt("Scan Lagi? [Y/n]");
        match input.next_line().await? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("n") => break,
            Some(_) => {
                flow.scan_again()?;
            }
            None => break,
        }
    }

    Ok(())
}

/// Returns `false` if input ended before a jemaat was picked.
async fn choose_jemaat<A>(
    api: &A,
    selector: &mut IdentitySelector,
    input: &mut Input,
    mut pending: Option<String>,
) -> Result<bool, Box<dyn std::error::Error>>
where
    A: KehadiranApi + ?Sized,
{
    loop {
        let query = match pending.take() {
            Some(q) => q,
            None => {
                prompt(&format!("Cari jemaat (min. {MIN_QUERY_CHARS} huruf)"));
                match input.next_line().await? {
                    Some(q) => q.trim().to_string(),
                    None => return Ok(false),
                }
            }
        };

        let found = match selector.search(api, &query).await {
            Ok(SearchOutcome::Prompt) => {
                println!("{}", format!("Ketik minimal {MIN_QUERY_CHARS} huruf").yellow());
                continue;
            }
            Ok(SearchOutcome::Results(found)) if found.is_empty() => {
                println!("{}", "Jemaat tidak ditemukan".yellow());
                continue;
            }
            Ok(SearchOutcome::Results(found)) => found,
            Err(e) => {
                println!("{} {}", "Pencarian gagal:".red(), e.user_message());
                continue;
            }
        };

        for (i, j) in found.iter().enumerate() {
            println!("  {:>2}. {} {}", i + 1, j.nama, format!("({})", j.nomor_induk).dimmed());
        }

        prompt("Pilih nomor (kosong untuk cari lagi)");
        let Some(choice) = input.next_line().await? else {
            return Ok(false);
        };
        match choice.trim().parse::<usize>() {
            Ok(n) if (1..=found.len()).contains(&n) => {
                selector.select(found[n - 1].clone());
                return Ok(true);
            }
            _ => continue,
        }
    }
}

fn prompt(label: &str) {
    print!("{} ", format!("{label}:").cyan().bold());
    let _ = std::io::stdout().flush();
}

fn render_panel(ok: bool, message: &str) {
    let (title, body) = if ok {
        ("Berhasil!".green().bold(), message.green())
    } else {
        ("Gagal!".red().bold(), message.red())
    };
    let rule = "─".repeat(message.chars().count().max(12) + 4);
    println!("┌{rule}┐");
    println!("  {title}");
    println!("  {body}");
    println!("└{rule}┘");
}
