//! HTTP/1.0 サーバーの例 (tokio_http10)
//!
//! 使い方:
//!   # TCP (ポート 8080)
//!   cargo run -p http10_server
//!
//!   # Unix ドメインソケット
//!   cargo run -p http10_server -- --unix /tmp/http10.sock
//!
//!   # ログを詳細にする
//!   RUST_LOG=debug cargo run -p http10_server
//!
//! Ctrl-C で新しい接続の受け入れを止めて終了する。

use shiguredo_http10::Response;
use tokio_http10::{CancelToken, HandlerError, Server, ServerRequest};
use tracing_subscriber::EnvFilter;

const SERVER_NAME: &str = concat!("http10_server/", env!("CARGO_PKG_VERSION"));

struct ServerOptions {
    port: u16,
    unix_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = parse_args()?;

    let server = match &options.unix_path {
        #[cfg(unix)]
        Some(path) => {
            let _ = std::fs::remove_file(path);
            Server::new(tokio_http10::UnixListener::bind(path.as_str())?)
        }
        #[cfg(not(unix))]
        Some(_) => return Err("--unix is only supported on Unix".into()),
        None => Server::bind(&format!("0.0.0.0:{}", options.port)).await?,
    };
    tracing::info!(addr = ?server.local_addr(), "HTTP/1.0 server listening");

    let (handle, token) = CancelToken::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
            handle.cancel();
        }
    });

    server.serve_until(handle_request, token).await?;

    if let Some(path) = &options.unix_path {
        let _ = std::fs::remove_file(path);
    }
    Ok(())
}

fn parse_args() -> Result<ServerOptions, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "http10_server";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    // --port オプション
    let port: u16 = noargs::opt("port")
        .short('p')
        .doc("TCP port to listen on")
        .default("8080")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // --unix オプション
    let unix_path: Option<String> = noargs::opt("unix")
        .doc("Listen on a Unix domain socket instead of TCP")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        std::process::exit(0);
    }

    Ok(ServerOptions { port, unix_path })
}

async fn handle_request(request: ServerRequest) -> Result<Response, HandlerError> {
    tracing::info!(
        method = %request.method,
        target = %request.raw_target,
        version = %request.version,
        "request"
    );

    let path = request.path().to_string();
    let response = match path.as_str() {
        "/" => {
            let body = r#"<!DOCTYPE html>
<html>
<head><title>shiguredo_http10 Server</title></head>
<body>
<h1>Welcome to shiguredo_http10 Server</h1>
<p>Each connection carries exactly one request and one response.</p>
<ul>
<li><a href="/info">/info</a> - Server information</li>
<li><a href="/echo">/echo</a> - Echo request details</li>
</ul>
</body>
</html>
"#;
            Response::new(200, "OK")
                .header("Content-Type", "text/html; charset=utf-8")
                .body(body)
        }
        "/info" => {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            let body = format!(
                r#"{{"server":"shiguredo_http10","version":"{}","timestamp":{}}}"#,
                env!("CARGO_PKG_VERSION"),
                now
            );
            Response::new(200, "OK")
                .header("Content-Type", "application/json")
                .body(body)
        }
        "/echo" => echo(request).await?,
        _ => Response::new(404, "Not Found")
            .header("Content-Type", "text/plain")
            .body("404 Not Found\n"),
    };

    Ok(response.header("Server", SERVER_NAME))
}

async fn echo(request: ServerRequest) -> Result<Response, HandlerError> {
    let mut text = format!(
        "Method: {}\nTarget: {}\nVersion: {}\n\nHeaders:\n",
        request.method, request.raw_target, request.version
    );
    for (name, values) in &request.headers {
        for value in values {
            text.push_str(&format!("  {}: {}\n", name, value));
        }
    }

    let body = request.body.bytes().await?;
    if !body.is_empty() {
        text.push_str(&format!("\nBody ({} bytes):\n", body.len()));
        match std::str::from_utf8(&body) {
            Ok(s) => text.push_str(s),
            Err(_) => text.push_str("[binary data]"),
        }
    }

    Ok(Response::new(200, "OK")
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(text))
}
