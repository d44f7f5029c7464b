//! # stride-app
//!
//! STRIDE 클라이언트 바이너리 진입점.
//! DI 컨테이너 역할, 세션 복원, 대시보드 동기화, 라이프사이클 관리.

mod lifecycle;
mod wiring;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stride_core::config::AppConfig;
use stride_core::config_manager::ConfigManager;
use stride_core::models::event::ProfileUpdate;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::wiring::AppContext;

/// 비밀번호 환경변수 (CLI 인자 대신 사용)
const PASSWORD_ENV: &str = "STRIDE_PASSWORD";

/// STRIDE 클라이언트
///
/// 개인 성장 대시보드 세션 관리 및 동기화
#[derive(Parser, Debug)]
#[command(name = "stride")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 서버 URL 지정 (설정 파일, STRIDE_SERVER_URL보다 우선)
    #[arg(long, short = 's', global = true)]
    server: Option<String>,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 로그인 후 토큰 저장
    Login {
        #[arg(long)]
        email: String,
        /// 생략 시 STRIDE_PASSWORD 환경변수 사용
        #[arg(long)]
        password: Option<String>,
    },
    /// 회원가입 후 토큰 저장
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// 생략 시 STRIDE_PASSWORD 환경변수 사용
        #[arg(long)]
        password: Option<String>,
    },
    /// 저장된 토큰 삭제
    Logout,
    /// 현재 사용자 출력
    Whoami,
    /// 대시보드 1회 조회 후 JSON 출력
    Dashboard,
    /// 대시보드 변경을 계속 출력 (Ctrl+C로 종료)
    Watch {
        /// 시작 후 프로필 변경 알림을 한 번 발행 (지연 재조회 확인용)
        #[arg(long)]
        notify_profile_updated: bool,
    },
}

/// 설정 로드 (파일 → 환경변수 → CLI 인자 순으로 덮어쓰기)
fn load_config(args: &Args) -> Result<AppConfig> {
    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone())?,
        None => ConfigManager::new()?,
    };
    let mut config = manager.get();
    config.apply_env_overrides();
    if let Some(ref server_url) = args.server {
        config.server.base_url = server_url.clone();
    }
    Ok(config)
}

fn resolve_password(password: Option<String>) -> Result<String> {
    password
        .or_else(|| std::env::var(PASSWORD_ENV).ok())
        .ok_or_else(|| anyhow!("--password 또는 {PASSWORD_ENV} 환경변수가 필요합니다"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "stride={},stride_app={},stride_core={},stride_storage={},stride_network={},stride_sync={}",
        args.log_level,
        args.log_level,
        args.log_level,
        args.log_level,
        args.log_level,
        args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let ctx = AppContext::build(config)?;

    match args.command {
        Command::Login { email, password } => {
            let password = resolve_password(password)?;
            let user = ctx.session.login(&email, &password).await?;
            println!("로그인 성공: {} <{}>", user.name, user.email);
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let password = resolve_password(password)?;
            let user = ctx.session.register(&name, &email, &password).await?;
            println!("회원가입 성공: {} <{}>", user.name, user.email);
        }
        Command::Logout => {
            ctx.session.logout();
            println!("로그아웃 완료");
        }
        Command::Whoami => {
            ctx.session.initialize().await;
            match ctx.session.current_user() {
                Some(user) if ctx.session.is_authenticated() => print_json(&user)?,
                _ => println!("로그인되어 있지 않습니다"),
            }
        }
        Command::Dashboard => {
            ctx.session.initialize().await;
            if !ctx.session.is_authenticated() {
                return Err(anyhow!("로그인되어 있지 않습니다"));
            }
            // 시작 시 예약된 첫 조회가 끝날 때까지 대기
            let controller = ctx.start_dashboard();
            let mut snapshots = controller.subscribe();
            let snapshot = snapshots
                .wait_for(|s| !s.is_loading && (s.data.is_some() || s.last_error.is_some()))
                .await?
                .clone();
            controller.shutdown();
            print_json(&snapshot)?;
        }
        Command::Watch {
            notify_profile_updated,
        } => run_watch(&ctx, notify_profile_updated).await?,
    }

    Ok(())
}

/// 스냅샷 변경을 종료 신호까지 출력
async fn run_watch(ctx: &AppContext, notify_profile_updated: bool) -> Result<()> {
    ctx.session.initialize().await;
    if !ctx.session.is_authenticated() {
        warn!("로그인되어 있지 않음, 로그인 이후 변경만 반영됩니다");
    }

    let controller = ctx.start_dashboard();

    if notify_profile_updated {
        ctx.bus.publish_profile_updated(ProfileUpdate::default());
    }

    info!("대시보드 감시 시작");
    lifecycle::run_until(
        controller.subscribe(),
        lifecycle::shutdown_signal(),
        print_json,
    )
    .await?;

    controller.shutdown();
    info!("대시보드 감시 종료");
    Ok(())
}
