/// デコーダーの制限設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderLimits {
    /// 最大行長 (デフォルト: 8KB)
    ///
    /// リクエストライン、ステータスライン、ヘッダー行のすべてに適用する。
    /// 行終端 (CRLF) は含まない。
    pub max_header_line_size: usize,
    /// 最大ヘッダー数 (デフォルト: 100)
    pub max_headers_count: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_header_line_size: 8 * 1024, // 8KB
            max_headers_count: 100,
        }
    }
}

impl DecoderLimits {
    /// 制限なしの設定を作成
    pub fn unlimited() -> Self {
        Self {
            max_header_line_size: usize::MAX,
            max_headers_count: usize::MAX,
        }
    }

    /// 行長を検査
    pub fn check_line(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_header_line_size {
            return Err(crate::Error::HeaderLineTooLong {
                size,
                limit: self.max_header_line_size,
            });
        }
        Ok(())
    }

    /// ヘッダー数を検査
    ///
    /// `count` は追加しようとしているヘッダーを含めた数。
    pub fn check_headers_count(&self, count: usize) -> Result<(), crate::Error> {
        if count > self.max_headers_count {
            return Err(crate::Error::TooManyHeaders {
                count,
                limit: self.max_headers_count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = DecoderLimits::default();
        assert!(limits.check_line(8 * 1024).is_ok());
        assert!(matches!(
            limits.check_line(8 * 1024 + 1),
            Err(crate::Error::HeaderLineTooLong { .. })
        ));
        assert!(limits.check_headers_count(100).is_ok());
        assert!(matches!(
            limits.check_headers_count(101),
            Err(crate::Error::TooManyHeaders {
                count: 101,
                limit: 100
            })
        ));
    }

    #[test]
    fn test_unlimited() {
        let limits = DecoderLimits::unlimited();
        assert!(limits.check_line(usize::MAX).is_ok());
        assert!(limits.check_headers_count(usize::MAX).is_ok());
    }
}
