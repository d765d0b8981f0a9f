//! Console game loop: load content, resolve typed input, print the story.

use ashfall_core::resolver::SolarClassifier;
use ashfall_core::{
    GadgetOp, GameSession, Message, ResourceKind, SessionConfig, SessionError, TurnReport,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

const MAX_TURNS: u32 = 50;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("{}", "=".repeat(60));
    println!("애쉬폴 - 폐허가 된 서울에서 살아남기");
    println!("{}", "=".repeat(60));
    println!("\n게임을 시작합니다...\n");

    let data_dir = data_dir();
    let encounters = data_dir.join("encounters.json");
    let gadgets = data_dir.join("gadgets.json");

    // Missing encounter content is a hard stop; gadget metadata is optional.
    let config = match SessionConfig::from_files(
        &encounters,
        gadgets.exists().then_some(gadgets.as_path()),
    ) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("오류: 인카운터 파일을 불러올 수 없습니다 ({}): {error}", encounters.display());
            std::process::exit(1);
        }
    };
    let config = config
        .with_starting_gadget("근력", 1)
        .with_starting_gadget("날렵함", 1);

    let mut session = match SolarClassifier::from_env() {
        Ok(classifier) => GameSession::with_classifier(config, Box::new(classifier)),
        Err(_) => {
            println!("(UPSTAGE_API_KEY가 없어 로컬 매칭만 사용합니다)\n");
            GameSession::new(config)
        }
    };

    if session.start().is_none() {
        println!("인카운터를 로드할 수 없습니다.");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut turn = 0u32;

    while !session.is_game_over() && turn < MAX_TURNS {
        turn += 1;

        let Some(encounter) = session.current_encounter() else {
            println!("\n더 이상 겪을 일이 없습니다. 오늘은 여기까지.");
            break;
        };
        print_encounter_messages(&encounter.messages);
        print_state(&session);

        if session.available_choices().is_empty() {
            println!("\n사용 가능한 선택지가 없습니다. 게임을 종료합니다.");
            break;
        }

        print!("\n당신의 선택: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let input = line?;

        match session.resolve_and_apply(&input).await {
            Ok(report) => {
                print_report(&report);
                if report.next_encounter_id.is_none() && !report.outcome.game_over {
                    println!("\n더 이상 겪을 일이 없습니다. 오늘은 여기까지.");
                    break;
                }
            }
            Err(SessionError::EmptyInput) => {
                println!("입력을 입력해주세요.");
                turn -= 1;
            }
            Err(error) => {
                eprintln!("오류: {error}");
                break;
            }
        }
    }

    if session.is_game_over() {
        if let Some(reason) = session.game_over_reason() {
            println!("\n게임 오버: {reason}");
        }
    }
    println!("\n{}턴을 버텼습니다.", session.snapshot().turn);
    Ok(())
}

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ASHFALL_DATA") {
        return PathBuf::from(dir);
    }
    // Prefer a data/ directory beside the binary's manifest, then the cwd.
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    if manifest.exists() {
        manifest
    } else {
        PathBuf::from("data")
    }
}

fn print_encounter_messages(messages: &[Message]) {
    println!();
    for message in messages {
        match message {
            Message::Text { content } => {
                if !content.is_empty() {
                    println!("{content}");
                }
            }
            Message::Image { url, .. } => {
                if url.is_empty() {
                    println!("[이미지]");
                } else {
                    println!("[이미지: {url}]");
                }
            }
        }
    }
    println!("\n채팅창에 당신의 행동이나 선택을 입력하세요.");
}

fn print_state(session: &GameSession) {
    let state = session.engine().state();
    let caps = |kind: ResourceKind| (state.resources.get(kind), kind.cap());
    let (health, health_cap) = caps(ResourceKind::Vitality);
    let (mental, mental_cap) = caps(ResourceKind::Composure);
    let (money, money_cap) = caps(ResourceKind::Currency);

    println!("\n현재 상태:");
    println!("  체력: {health}/{health_cap}");
    println!("  멘탈: {mental}/{mental_cap}");
    println!("  돈: {money}/{money_cap}");

    if !state.gadgets.counts().is_empty() {
        let names: Vec<&str> = state
            .gadgets
            .counts()
            .keys()
            .map(|id| session.engine().gadget_catalog().display_name(id))
            .collect();
        println!("  보유 가젯: {}", names.join(", "));
    }
}

fn print_report(report: &TurnReport) {
    println!("\n{}", report.story);

    if let Some(deltas) = &report.outcome.results.resources {
        let changes: Vec<String> = deltas
            .iter()
            .filter(|(_, delta)| **delta != 0)
            .map(|(kind, delta)| format!("{kind}: {delta:+}"))
            .collect();
        if !changes.is_empty() {
            println!("자원 변화: {}", changes.join(", "));
        }
    }

    if let Some(actions) = &report.outcome.results.gadgets {
        let changes: Vec<String> = actions
            .iter()
            .map(|action| match action.action {
                GadgetOp::Acquire => format!("{} 획득 (+{})", action.id, action.amount),
                GadgetOp::Lose => format!("{} 손실 (-{})", action.id, action.amount),
            })
            .collect();
        if !changes.is_empty() {
            println!("가젯 변화: {}", changes.join(", "));
        }
    }
}
