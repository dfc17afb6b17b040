use webroot::http::parser::{ParseError, parse_http_request};
use webroot::http::request::Method;
use webroot::http::response::StatusCode;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.method, Some(Method::GET));
    assert_eq!(parsed.target, "/index.html");
    assert_eq!(parsed.host, "/index.html");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    assert_eq!(parsed.status, StatusCode::Ok);
    assert_eq!(parsed.errors, 0);
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /form.php HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.method, Some(Method::POST));
    assert_eq!(parsed.body, b"hello".to_vec());
    assert_eq!(parsed.status, StatusCode::Ok);
}

#[test]
fn test_body_is_tail_of_whole_buffer() {
    // declared length longer than the payload reaches back into the headers
    let req = b"PUT /f HTTP/1.1\r\nContent-Length: 9\r\n\r\nhello";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.body, b"\r\n\r\nhello".to_vec());
}

#[test]
fn test_body_length_larger_than_buffer_takes_everything() {
    let req = b"PUT /f HTTP/1.1\r\nContent-Length: 4096\r\n\r\nhi";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.body, req.to_vec());
}

#[test]
fn test_parse_request_with_empty_body() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
    let parsed = parse_http_request(req);

    assert!(parsed.body.is_empty());
    assert_eq!(parsed.status, StatusCode::Ok);
}

#[test]
fn test_parse_request_with_binary_body() {
    let req = b"PUT /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\xff\x03";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.body, vec![0x00, 0x01, 0xff, 0x03]);
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.headers.len(), 3);
    assert_eq!(parsed.headers.get("User-Agent").unwrap(), "test-client");
    assert_eq!(parsed.headers.get("Accept").unwrap(), "*/*");
}

#[test]
fn test_repeated_headers_are_comma_joined() {
    let req = b"GET / HTTP/1.1\r\nX-Tag: a\r\nX-Tag: b\r\nX-Tag: c\r\n\r\n";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.headers.get("X-Tag").unwrap(), "a,b,c");
}

#[test]
fn test_header_value_keeps_later_separators() {
    let req = b"GET / HTTP/1.1\r\nReferer: http://a: b\r\n\r\n";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.headers.get("Referer").unwrap(), "http://a: b");
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search.php?q=rust&page=2 HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.target, "/search.php?q=rust&page=2");
    assert_eq!(parsed.host, "/search.php");
    assert_eq!(parsed.query, "q=rust&page=2");
    assert_eq!(parsed.port, None);
}

#[test]
fn test_parse_request_with_port() {
    let req = b"GET /page:8080?x=1 HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req);

    assert_eq!(parsed.host, "/page");
    assert_eq!(parsed.port.as_deref(), Some("8080"));
    assert_eq!(parsed.query, "x=1");
}

#[test]
fn test_unknown_method_is_not_implemented() {
    for method in ["PATCH", "OPTIONS", "get", "BREW"] {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method);
        let parsed = parse_http_request(req.as_bytes());

        assert_eq!(parsed.method, None);
        assert_eq!(parsed.status, StatusCode::NotImplemented);
        assert!(parsed.errors >= 1);
    }
}

#[test]
fn test_unsupported_version() {
    for version in ["HTTP/2.0", "HTTP/0.9", "http/1.1"] {
        let req = format!("GET / {}\r\n\r\n", version);
        let parsed = parse_http_request(req.as_bytes());

        assert_eq!(parsed.status, StatusCode::HttpVersionNotSupported);
        assert_eq!(parsed.errors, 1);
    }
}

#[test]
fn test_http_1_0_is_accepted() {
    let parsed = parse_http_request(b"HEAD / HTTP/1.0\r\n\r\n");

    assert_eq!(parsed.method, Some(Method::HEAD));
    assert_eq!(parsed.status, StatusCode::Ok);
}

#[test]
fn test_last_validation_failure_wins() {
    let parsed = parse_http_request(b"BREW / HTTP/3\r\n\r\n");

    assert_eq!(parsed.status, StatusCode::HttpVersionNotSupported);
    assert_eq!(parsed.errors, 2);
}

#[test]
fn test_post_without_content_length() {
    let parsed = parse_http_request(b"POST /form.php HTTP/1.1\r\nHost: x\r\n\r\nname=value");

    assert_eq!(parsed.status, StatusCode::LengthRequired);
    assert!(parsed.body.is_empty());
}

#[test]
fn test_put_without_content_length_is_fine() {
    let parsed = parse_http_request(b"PUT /f HTTP/1.1\r\n\r\n");

    assert_eq!(parsed.status, StatusCode::Ok);
    assert!(parsed.body.is_empty());
}

#[test]
fn test_malformed_request_line() {
    for line in ["GET /", "GET / HTTP/1.1 extra", "GET"] {
        let req = format!("{}\r\n\r\n", line);
        let parsed = parse_http_request(req.as_bytes());

        assert_eq!(parsed.status, StatusCode::BadRequest);
    }
}

#[test]
fn test_leading_blank_lines_are_skipped() {
    let parsed = parse_http_request(b"\r\n\r\nGET /a HTTP/1.1\r\n\r\n");

    assert_eq!(parsed.status, StatusCode::Ok);
    assert_eq!(parsed.host, "/a");
}

#[test]
fn test_parse_malformed_header() {
    let parsed = parse_http_request(b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n");

    assert_eq!(parsed.status, StatusCode::BadRequest);
    // the request line was still parsed
    assert_eq!(parsed.method, Some(Method::GET));
}

#[test]
fn test_header_without_space_after_colon_is_malformed() {
    let parsed = parse_http_request(b"GET / HTTP/1.1\r\nHost:example.com\r\n\r\n");

    assert_eq!(parsed.status, StatusCode::BadRequest);
}

#[test]
fn test_non_numeric_content_length() {
    let parsed = parse_http_request(b"PUT /f HTTP/1.1\r\nContent-Length: ten\r\n\r\nhello");

    assert_eq!(parsed.status, ParseError::InvalidContentLength.status());
    assert_eq!(parsed.status, StatusCode::InternalServerError);
}

#[test]
fn test_headers_never_terminated() {
    let parsed = parse_http_request(b"GET / HTTP/1.1\r\nHost: example.com");

    assert_eq!(parsed.status, StatusCode::Ok);
    assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
}

#[test]
fn test_empty_buffer() {
    let parsed = parse_http_request(b"");

    assert_eq!(parsed.method, None);
    assert_eq!(parsed.status, StatusCode::Ok);
    assert_eq!(parsed.errors, 0);
}

#[test]
fn test_parse_error_status_mapping() {
    assert_eq!(ParseError::MalformedRequestLine.status(), StatusCode::BadRequest);
    assert_eq!(ParseError::MalformedHeader.status(), StatusCode::BadRequest);
}
