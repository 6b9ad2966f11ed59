//! 行単位の読み取り
//!
//! 行終端 (`\n`) までしか消費しないので、ヘッダーの後ろに続くボディのバイトは
//! リーダーのバッファに残る。

use shiguredo_http10::{DecoderLimits, Headers, parse_header_line};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::{Error, Result};

/// 1 行読み取る
///
/// 行終端 (CRLF、または LF のみ) は取り除く。
/// 行の途中または先頭で EOF になった場合は `Error::ConnectionClosed`。
pub async fn read_line<R>(reader: &mut R, limits: &DecoderLimits) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    // CRLF の分だけ余裕を持たせる
    let max_raw = limits.max_header_line_size.saturating_add(2);

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Err(Error::ConnectionClosed);
        }

        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        line.extend_from_slice(&available[..used]);
        reader.consume(used);

        if line.len() > max_raw {
            return Err(shiguredo_http10::Error::HeaderLineTooLong {
                size: line.len(),
                limit: limits.max_header_line_size,
            }
            .into());
        }
        if done {
            break;
        }
    }

    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    limits.check_line(line.len())?;

    String::from_utf8(line).map_err(|e| {
        shiguredo_http10::Error::InvalidData(format!("invalid UTF-8: {e}")).into()
    })
}

/// ヘッダー行を空行まで読み取る
///
/// 空行の後ろのバイトはボディとして読まずに残す。
pub async fn read_headers<R>(reader: &mut R, limits: &DecoderLimits) -> Result<Headers>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = Headers::new();
    let mut count = 0usize;

    loop {
        let line = read_line(reader, limits).await?;
        if line.is_empty() {
            return Ok(headers);
        }

        count += 1;
        limits.check_headers_count(count)?;

        let (name, value) = parse_header_line(&line)?;
        headers.append(&name, &value);
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, BufReader};

    use super::*;

    #[tokio::test]
    async fn test_read_line_crlf_and_lf() {
        let mut reader = BufReader::new(&b"first\r\nsecond\nthird"[..]);
        let limits = DecoderLimits::default();
        assert_eq!(read_line(&mut reader, &limits).await.unwrap(), "first");
        assert_eq!(read_line(&mut reader, &limits).await.unwrap(), "second");
        assert!(matches!(
            read_line(&mut reader, &limits).await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_read_line_across_small_buffers() {
        let data = b"HTTP/1.0 200 OK\r\nrest";
        let mut reader = BufReader::with_capacity(3, &data[..]);
        let limits = DecoderLimits::default();
        assert_eq!(
            read_line(&mut reader, &limits).await.unwrap(),
            "HTTP/1.0 200 OK"
        );
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b"rest");
    }

    #[tokio::test]
    async fn test_read_line_too_long() {
        let limits = DecoderLimits {
            max_header_line_size: 4,
            ..DecoderLimits::default()
        };
        let mut reader = BufReader::new(&b"abcd\r\n"[..]);
        assert_eq!(read_line(&mut reader, &limits).await.unwrap(), "abcd");

        let mut reader = BufReader::new(&b"abcde\r\n"[..]);
        assert!(matches!(
            read_line(&mut reader, &limits).await,
            Err(Error::Http(shiguredo_http10::Error::HeaderLineTooLong { .. }))
        ));

        let mut reader = BufReader::new(&b"abcdefghijklmnop"[..]);
        assert!(matches!(
            read_line(&mut reader, &limits).await,
            Err(Error::Http(shiguredo_http10::Error::HeaderLineTooLong { .. }))
        ));
    }

    #[tokio::test]
    async fn test_read_line_invalid_utf8() {
        let mut reader = BufReader::new(&b"\xff\xfe\r\n"[..]);
        let result = read_line(&mut reader, &DecoderLimits::default()).await;
        assert!(matches!(
            result,
            Err(Error::Http(shiguredo_http10::Error::InvalidData(_)))
        ));
    }

    #[tokio::test]
    async fn test_read_headers_stops_at_empty_line() {
        let data = b"Host: a\r\nX-Multi: 1\r\nx-multi: 2\r\n\r\nBody: not-a-header\r\n\r\n";
        let mut reader = BufReader::new(&data[..]);
        let headers = read_headers(&mut reader, &DecoderLimits::default())
            .await
            .unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("host"), Some("a"));
        assert_eq!(headers.get_all("X-Multi"), ["1", "2"]);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b"Body: not-a-header\r\n\r\n");
    }

    #[tokio::test]
    async fn test_read_headers_too_many() {
        let limits = DecoderLimits {
            max_headers_count: 2,
            ..DecoderLimits::default()
        };
        let mut reader = BufReader::new(&b"A: 1\r\nB: 2\r\nC: 3\r\n\r\n"[..]);
        assert!(matches!(
            read_headers(&mut reader, &limits).await,
            Err(Error::Http(shiguredo_http10::Error::TooManyHeaders { .. }))
        ));
    }

    #[tokio::test]
    async fn test_read_headers_malformed() {
        let mut reader = BufReader::new(&b"NoColon\r\n\r\n"[..]);
        assert!(matches!(
            read_headers(&mut reader, &DecoderLimits::default()).await,
            Err(Error::Http(shiguredo_http10::Error::InvalidHeaderLine(_)))
        ));
    }
}
