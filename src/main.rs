use async_trait::async_trait;
use std::path::{Path, PathBuf};
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use tokio::io::{AsyncBufReadExt, BufReader};
use zksurfer::config::Config;
use zksurfer::content::{Attachment, UserInput};
use zksurfer::hooks::{ImageMinter, ProofSink, mint_segment};
use zksurfer::proof::{ExportOutcome, export_proof};
use zksurfer::render::{Segment, render_message};
use zksurfer::types::{ChatMessage, Role};
use zksurfer::{ChatSession, TurnOutcome};

/// Bundled defaults used when no .env is present
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

const PROOF_STAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day]-[hour][minute][second]");

const PREVIEW_CHARS: usize = 48;

fn load_dotenv() {
    // A local .env wins over the bundled defaults
    if dotenvy::dotenv().is_ok() {
        return;
    }

    // Variables already in the environment are left alone
    if let Err(err) = dotenvy::from_read(BUNDLED_CONFIG.as_bytes()) {
        eprintln!("bundled config ignored: {err}");
    }
}

// ============================================
// Proof export to disk
// ============================================

struct FileProofSink {
    dir: PathBuf,
}

impl FileProofSink {
    fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn default_dir() -> PathBuf {
        if let Some(downloads) = dirs::download_dir() {
            return downloads;
        }
        if let Some(data_dir) = dirs::data_local_dir() {
            return data_dir.join("zksurfer").join("proofs");
        }
        PathBuf::from(".")
    }

    fn stamped_name(suggested_name: &str) -> String {
        let path = Path::new(suggested_name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("proof");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        match now.format(PROOF_STAMP_FORMAT) {
            Ok(stamp) => format!("{stem}-{stamp}.{ext}"),
            Err(_) => suggested_name.to_string(),
        }
    }
}

#[async_trait]
impl ProofSink for FileProofSink {
    async fn save(&self, suggested_name: &str, document: &str) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::stamped_name(suggested_name));
        tokio::fs::write(&path, document).await?;
        println!("proof saved to {}", path.display());
        Ok(())
    }
}

// ============================================
// Minting
// ============================================

/// Minting needs a connected wallet, which a terminal session never has.
struct WalletlessMinter;

#[async_trait]
impl ImageMinter for WalletlessMinter {
    async fn mint_from_image(&self, _image: &str) -> anyhow::Result<String> {
        anyhow::bail!("no wallet connected; mint from the wallet-enabled client")
    }
}

/// Most recent image shown in the conversation.
fn latest_image(log: &[ChatMessage]) -> Option<Segment> {
    log.iter()
        .rev()
        .flat_map(render_message)
        .find(|segment| segment.image_source().is_some())
}

// ============================================
// Terminal front-end
// ============================================

/// `@path` tokens attach a file; the rest of the line is the prompt.
fn parse_input(line: &str) -> UserInput {
    let mut attachment = None;
    let mut words = Vec::new();
    for word in line.split_whitespace() {
        match word.strip_prefix('@') {
            Some(path) if attachment.is_none() && !path.is_empty() => {
                attachment = Some(Attachment::path(path));
            }
            _ => words.push(word),
        }
    }
    UserInput {
        text: words.join(" "),
        attachment,
    }
}

fn preview(source: &str) -> String {
    if source.starts_with("data:") && source.len() > PREVIEW_CHARS {
        let head: String = source.chars().take(PREVIEW_CHARS).collect();
        format!("{head}…")
    } else {
        source.to_string()
    }
}

fn print_message(message: &ChatMessage) {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    println!("[{who}]");
    for segment in render_message(message) {
        match segment {
            Segment::Text(text) => println!("{text}"),
            Segment::Code { language, code } => println!("```{language}\n{code}\n```"),
            Segment::Image { source } => println!("[image] {}", preview(&source)),
        }
    }
    if message.proof.is_some() {
        println!("(proof attached, /proof to export)");
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let session = ChatSession::from_config(&config);
    let sink = FileProofSink::new(FileProofSink::default_dir());

    println!("chatting with {}", config.endpoint);
    println!("commands: /log /proof /mint /cancel /quit, attach an image with @path");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "/quit" | "/exit" => break,
            "/cancel" => {
                if !session.cancel() {
                    println!("nothing in flight");
                }
            }
            "/log" => session.display_log().iter().for_each(print_message),
            "/mint" => match latest_image(&session.display_log()) {
                Some(image) => match mint_segment(&WalletlessMinter, &image).await {
                    Some(Ok(link)) => println!("minted: {link}"),
                    Some(Err(err)) => println!("mint failed: {err:#}"),
                    None => {}
                },
                None => println!("no image to mint"),
            },
            "/proof" => match export_proof(session.latest_proof().as_ref(), &sink).await {
                Ok(ExportOutcome::Saved) => {}
                Ok(ExportOutcome::NothingToExport) => println!("no proof data to download"),
                Err(err) => eprintln!("proof export failed: {err:#}"),
            },
            _ => {
                let input = parse_input(line);
                let session = session.clone();
                tokio::spawn(async move {
                    match session.submit(input).await {
                        TurnOutcome::Resolved(_) => {
                            if let Some(reply) = session.display_log().last() {
                                print_message(reply);
                            }
                        }
                        TurnOutcome::Failed(err) => println!("(no reply: {err})"),
                        TurnOutcome::Busy => println!("still waiting on the previous reply"),
                    }
                });
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attachment_token() {
        let input = parse_input("what is @./cat.png this");
        assert_eq!(input.text, "what is this");
        assert_eq!(input.attachment, Some(Attachment::path("./cat.png")));
    }

    #[test]
    fn plain_line_has_no_attachment() {
        let input = parse_input("email me @ noon");
        assert_eq!(input.text, "email me @ noon");
        assert!(input.attachment.is_none());
    }

    #[test]
    fn latest_image_prefers_newest_entry() {
        let log = vec![
            ChatMessage::assistant("/img/old.png", zksurfer::types::MessageKind::Image),
            ChatMessage::user("and again"),
            ChatMessage::assistant("/img/new.png", zksurfer::types::MessageKind::Image),
            ChatMessage::assistant("plain words", zksurfer::types::MessageKind::Text),
        ];
        let image = latest_image(&log).unwrap();
        assert_eq!(image.image_source(), Some("/img/new.png"));
        assert!(latest_image(&log[1..2]).is_none());
    }

    #[tokio::test]
    async fn terminal_minting_reports_missing_wallet() {
        let image = Segment::Image {
            source: "/img/car.png".into(),
        };
        let result = mint_segment(&WalletlessMinter, &image).await.unwrap();
        assert!(result.unwrap_err().to_string().contains("no wallet"));
    }

    #[test]
    fn stamped_name_keeps_stem_and_extension() {
        let name = FileProofSink::stamped_name("proof.json");
        assert!(name.starts_with("proof-"));
        assert!(name.ends_with(".json"));
    }
}
