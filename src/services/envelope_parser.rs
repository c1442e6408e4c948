//! 信封解析 - 业务能力层
//!
//! 表格接口返回的是 `/*O_o*/\ngoogle.visualization.Query.setResponse({...});` 这种
//! JSONP 包装。取第一个 `(` 之后到最后一个 `}`（含）之间的文本作为 JSON 解析。

use tracing::debug;

use crate::error::FetchError;
use crate::models::GvizDocument;

/// 从信封中取出 JSON 文本
pub fn extract_json(raw: &str) -> Result<&str, FetchError> {
    let start = raw
        .find('(')
        .ok_or_else(|| FetchError::malformed("响应中找不到 '('"))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| FetchError::malformed("响应中找不到 '}'"))?;

    if end <= start {
        return Err(FetchError::malformed("最后一个 '}' 出现在 '(' 之前"));
    }

    Ok(&raw[start + 1..=end])
}

/// 解析信封，返回包含 table 的文档
///
/// - 找不到信封或 JSON 不合法 → `MalformedEnvelope`
/// - 没有 table 字段 → `MalformedEnvelope`（接口返回 status=error 时带上错误详情）
/// - table 没有 rows 字段 → `EmptyWorksheet`
pub fn parse_envelope(raw: &str) -> Result<GvizDocument, FetchError> {
    let json_text = extract_json(raw)?;
    debug!("信封内 JSON 长度: {} 字节", json_text.len());

    let document: GvizDocument = serde_json::from_str(json_text)
        .map_err(|e| FetchError::malformed(format!("JSON解析失败: {}", e)))?;

    let Some(table) = document.table.as_ref() else {
        let reason = match document.status.as_deref() {
            Some("error") => format!(
                "接口返回错误: {}",
                document
                    .errors
                    .first()
                    .map(|issue| issue.describe())
                    .unwrap_or_else(|| "unknown error".to_string())
            ),
            _ => "文档中没有 table 字段".to_string(),
        };
        return Err(FetchError::malformed(reason));
    };

    if table.rows.is_none() {
        return Err(FetchError::EmptyWorksheet {
            sheet: String::new(),
        });
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","reqId":"0","status":"ok","sig":"1","table":{"cols":[{"id":"A","label":"Metric","type":"string"},{"id":"B","label":"Score","type":"number","pattern":"General"}],"rows":[{"c":[{"v":"Reach"},{"v":3.0,"f":"3"}]},{"c":[{"v":"Depth"},null]},{"c":[null,{"v":1.5}]}],"parsedNumHeaders":1}});"#;

    #[test]
    fn test_parse_sample_envelope() {
        let document = parse_envelope(SAMPLE).unwrap();
        let table = document.table.unwrap();

        assert_eq!(document.status.as_deref(), Some("ok"));
        assert_eq!(table.cols.unwrap().len(), 2);
        assert_eq!(table.rows.unwrap().len(), 3);
    }

    #[test]
    fn test_extract_json_uses_first_paren_and_last_brace() {
        let raw = "cb({\"a\":\"(x)\",\"b\":{}});";
        assert_eq!(extract_json(raw).unwrap(), "{\"a\":\"(x)\",\"b\":{}}");
    }

    #[test]
    fn test_not_an_envelope() {
        let err = parse_envelope("not an envelope").unwrap_err();
        assert!(matches!(err, FetchError::MalformedEnvelope { .. }));
    }

    #[test]
    fn test_brace_before_paren() {
        let err = parse_envelope("} then (").unwrap_err();
        assert!(matches!(err, FetchError::MalformedEnvelope { .. }));
    }

    #[test]
    fn test_invalid_json_inside_envelope() {
        let err = parse_envelope("setResponse({table: oops});").unwrap_err();
        assert!(matches!(err, FetchError::MalformedEnvelope { .. }));
    }

    #[test]
    fn test_missing_table() {
        let err = parse_envelope(r#"setResponse({"status":"ok"});"#).unwrap_err();
        assert!(matches!(err, FetchError::MalformedEnvelope { .. }));
    }

    #[test]
    fn test_error_status_carries_detail() {
        let raw = r#"setResponse({"status":"error","errors":[{"reason":"invalid_query","message":"INVALID_QUERY","detailed_message":"Invalid sheet name: nope"}]});"#;
        let err = parse_envelope(raw).unwrap_err();
        assert!(err.to_string().contains("Invalid sheet name: nope"));
    }

    #[test]
    fn test_table_without_rows_is_empty_worksheet() {
        let err = parse_envelope(r#"setResponse({"table":{"cols":[]}});"#).unwrap_err();
        assert!(matches!(err, FetchError::EmptyWorksheet { .. }));
    }

    #[test]
    fn test_empty_rows_array_is_accepted() {
        let document = parse_envelope(r#"setResponse({"table":{"cols":[],"rows":[]}});"#).unwrap();
        assert_eq!(document.table.unwrap().rows.unwrap().len(), 0);
    }
}
