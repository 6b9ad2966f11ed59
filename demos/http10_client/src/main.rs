//! HTTP/1.0 クライアントの例 (tokio_http10)
//!
//! 使い方:
//!   cargo run -p http10_client -- http://127.0.0.1:8080/
//!   cargo run -p http10_client -- -X POST -d "hello" http://127.0.0.1:8080/echo
//!   RUST_LOG=debug cargo run -p http10_client -- http://127.0.0.1:8080/info

use std::time::Duration;

use tokio_http10::{Client, ClientRequest, ClientResponse};
use tracing_subscriber::EnvFilter;

struct ClientOptions {
    url: String,
    method: String,
    data: Option<String>,
    content_type: Option<String>,
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(options) = parse_args()? else {
        return Ok(());
    };

    let client = Client::tcp()
        .connect_timeout(Duration::from_secs(options.timeout))
        .read_timeout(Duration::from_secs(options.timeout));

    let mut request = ClientRequest::new(&options.method, &options.url)
        .header("User-Agent", concat!("http10_client/", env!("CARGO_PKG_VERSION")))
        .header("Accept", "*/*");
    if let Some(content_type) = &options.content_type {
        request = request.header("Content-Type", content_type);
    }
    if let Some(data) = options.data {
        request = request.body(data);
    }

    let mut response = client.send(request).await?;
    let upload = response.upload();
    print_response(response).await?;

    // リクエストボディの送信結果
    match upload.finish().await {
        Ok(0) => {}
        Ok(n) => tracing::debug!(bytes = n, "request body sent"),
        Err(e) => eprintln!("request body was not fully sent: {}", e),
    }

    Ok(())
}

fn parse_args() -> Result<Option<ClientOptions>, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "http10_client";

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

    // --method オプション
    let method: String = noargs::opt("method")
        .short('X')
        .doc("Request method")
        .default("GET")
        .take(&mut args)
        .then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // --data オプション
    let data: Option<String> = noargs::opt("data")
        .short('d')
        .doc("Request body")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // --content-type オプション
    let content_type: Option<String> = noargs::opt("content-type")
        .short('t')
        .doc("Content-Type of the request body")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // --timeout オプション
    let timeout: u64 = noargs::opt("timeout")
        .doc("Connect and read timeout in seconds")
        .default("30")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // 位置引数: URL
    let url: String = noargs::arg("<URL>")
        .doc("URL to fetch (e.g., http://127.0.0.1:8080/)")
        .take(&mut args)
        .then(|a| Ok::<_, &str>(a.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        return Ok(None);
    }

    Ok(Some(ClientOptions {
        url,
        method,
        data,
        content_type,
        timeout,
    }))
}

async fn print_response(response: ClientResponse) -> Result<(), Box<dyn std::error::Error>> {
    if response.reason_phrase.is_empty() {
        println!("{} {}", response.version, response.status_code);
    } else {
        println!(
            "{} {} {}",
            response.version, response.status_code, response.reason_phrase
        );
    }

    for (name, value) in response.headers.lines() {
        println!("{}: {}", name, value);
    }
    for (name, value) in response.body.headers().lines() {
        println!("{}: {}", name, value);
    }
    println!();

    let body = response.body.bytes().await?;
    // ボディを表示 (テキストの場合)
    match std::str::from_utf8(&body) {
        Ok(text) if text.len() > 1000 => {
            let end = (0..=1000)
                .rev()
                .find(|&i| text.is_char_boundary(i))
                .unwrap_or(0);
            println!("{}...", &text[..end]);
            println!("\n[Body truncated, {} bytes total]", body.len());
        }
        Ok(text) => println!("{}", text),
        Err(_) => println!("[Binary body, {} bytes]", body.len()),
    }

    Ok(())
}
