//! readtome - 把文本读出来
//!
//! 流程：加载 .env 与配置 → 初始化日志 → 获取文本 → 合成、保存、播放

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use readtome::application::{
    AudioPlayerPort, RunFailure, RunReport, SynthesisSettings, SynthesizeText,
    SynthesizeTextHandler,
};
use readtome::config::{load_config_from_path, print_config, AppConfig};
use readtome::infrastructure::adapters::{
    ElevenLabsClient, ElevenLabsClientConfig, FileRunStorage, RodioPlayer, SilentPlayer,
    SymphoniaDecoder,
};
use readtome::infrastructure::input::{read_text_file, TextPrompt};

/// Read text aloud with ElevenLabs text-to-speech
#[derive(Debug, Parser)]
#[command(name = "readtome", version, about)]
struct Args {
    /// Text to read
    #[arg(short, long, conflicts_with = "file")]
    text: Option<String>,

    /// Read text from a .txt, .md or .docx file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Configuration file (defaults to config.toml / config.local.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save the audio without playing it
    #[arg(long)]
    no_play: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // .env 中的变量不覆盖已有环境变量
    dotenvy::dotenv().ok();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config_from_path(args.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    print_config(&config);

    let Some(text) = obtain_text(&args)? else {
        println!("No text provided. Exiting.");
        return Ok(());
    };

    let handler = build_handler(&config, args.no_play)?;

    println!("Converting text to speech...");

    let outcome = tokio::select! {
        result = handler.handle(SynthesizeText::new(text)) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received interrupt signal");
            println!("\nInterrupted. Files written so far are kept in {}", config.output.dir.display());
            println!("Goodbye!");
            return Ok(());
        }
    };

    match outcome {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(failure) => {
            print_failure(&failure);
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("warn,readtome={}", config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// 命令行参数优先，否则进入交互式输入
fn obtain_text(args: &Args) -> anyhow::Result<Option<String>> {
    if let Some(text) = &args.text {
        let text = text.trim();
        return Ok((!text.is_empty()).then(|| text.to_string()));
    }

    if let Some(path) = &args.file {
        return Ok(Some(read_text_file(path)?));
    }

    Ok(TextPrompt::stdio().read_text()?)
}

fn build_handler(config: &AppConfig, no_play: bool) -> anyhow::Result<SynthesizeTextHandler> {
    let el = &config.elevenlabs;

    let client_config =
        ElevenLabsClientConfig::new(el.base_url.clone()).with_timeout(el.timeout_secs);
    let synthesizer = Arc::new(ElevenLabsClient::new(client_config)?);

    let player: Arc<dyn AudioPlayerPort> = if config.playback.enabled && !no_play {
        Arc::new(RodioPlayer::new())
    } else {
        Arc::new(SilentPlayer::new())
    };

    let settings = SynthesisSettings {
        api_key: el.api_key(),
        voice: el.voice_profile(),
        chunking: config.chunking.chunk_config(),
    };

    Ok(SynthesizeTextHandler::new(
        settings,
        synthesizer,
        Arc::new(SymphoniaDecoder::mp3()),
        player,
        Arc::new(FileRunStorage::new(&config.output.dir)),
    ))
}

fn print_report(report: &RunReport) {
    println!("\nDone! {} chunk(s) converted.", report.chunk_count);
    println!("Saved to {}", report.run_dir.display());
    for name in &report.audio_files {
        println!("  - {}", name);
    }
    if let Some(combined) = &report.combined_file {
        println!("Combined audio: {}", combined.display());
    }
}

fn print_failure(failure: &RunFailure) {
    eprintln!("\nError: {}", failure.error);
    if let Some(dir) = &failure.run_dir {
        eprintln!("Run directory: {}", dir.display());
        if failure.kept_files.is_empty() {
            eprintln!("No audio files were written.");
        } else {
            eprintln!("Kept files:");
            for name in &failure.kept_files {
                eprintln!("  - {}", name);
            }
        }
    }
}
