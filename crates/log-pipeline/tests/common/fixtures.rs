//! 테스트용 로그 라인 픽스처

/// Apache2 combined 라인을 만듭니다.
pub fn access_line(client: &str, request: &str, status: u16, referer: &str) -> String {
    format!(
        r#"{client} - - [10/Oct/2023:13:55:36 +0200] "{request}" {status} 512 "{referer}" "Mozilla/5.0 (compatible)""#
    )
}

/// nginx error log 라인을 만듭니다.
pub fn error_line(level: &str, message: &str, client: Option<&str>) -> String {
    let mut line = format!("2023/10/10 13:55:36 [{level}] 4242#4242: *17 {message}");
    if let Some(client) = client {
        line.push_str(&format!(", client: {client}, server: example.com"));
    }
    line
}
