//! Tests for the CGI environment contract and interpreter invocation

use webroot::http::request::{Method, ParsedRequest, RequestBuilder};
use webroot::resource::{CgiEnvironment, CgiInvoker};

fn request(method: Method, target: &str, body: &[u8]) -> ParsedRequest {
    RequestBuilder::new()
        .method(method)
        .target(target)
        .body(body.to_vec())
        .build()
        .unwrap()
}

#[test]
fn test_get_environment() {
    let req = request(Method::GET, "/search.php?q=rust", b"");
    let env = CgiEnvironment::for_request(&req, "/srv/www/search.php").unwrap();

    assert_eq!(env.get("QUERY_STRING"), Some("q=rust"));
    assert_eq!(env.get("SCRIPT_FILENAME"), Some("/srv/www/search.php"));
    assert_eq!(env.get("REQUEST_METHOD"), Some("GET"));
    assert_eq!(env.get("REDIRECT_STATUS"), Some("0"));
    assert_eq!(env.get("CONTENT_LENGTH"), None);
    assert_eq!(env.stdin(), None);
}

#[test]
fn test_head_uses_get_contract() {
    let req = request(Method::HEAD, "/search.php", b"");
    let env = CgiEnvironment::for_request(&req, "/srv/www/search.php").unwrap();

    assert_eq!(env.get("REQUEST_METHOD"), Some("HEAD"));
    assert_eq!(env.get("QUERY_STRING"), Some(""));
}

#[test]
fn test_post_environment() {
    let req = request(Method::POST, "/form.php", b"name=ferris");
    let env = CgiEnvironment::for_request(&req, "/srv/www/form.php").unwrap();

    assert_eq!(env.get("GATEWAY_INTERFACE"), Some("CGI/1.1"));
    assert_eq!(env.get("SCRIPT_FILENAME"), Some("/srv/www/form.php"));
    assert_eq!(env.get("REQUEST_METHOD"), Some("POST"));
    assert_eq!(env.get("SERVER_PROTOCOL"), Some("HTTP/1.1"));
    assert_eq!(env.get("REMOTE_HOST"), Some("127.0.0.1"));
    assert_eq!(
        env.get("CONTENT_TYPE"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(env.get("CONTENT_LENGTH"), Some("11"));
    assert_eq!(env.get("QUERY_STRING"), None);
    assert_eq!(env.stdin(), Some(&b"name=ferris"[..]));
}

#[test]
fn test_no_mapping_for_put_and_delete() {
    for method in [Method::PUT, Method::DELETE] {
        let req = request(method, "/page.php", b"");
        assert!(CgiEnvironment::for_request(&req, "/srv/www/page.php").is_none());
    }
}

#[tokio::test]
async fn test_missing_interpreter_fails() {
    let invoker = CgiInvoker::new("/nonexistent/php-cgi");
    let req = request(Method::GET, "/page.php", b"");

    assert!(invoker.invoke(&req, "/srv/www/page.php").await.is_err());
}

#[cfg(unix)]
mod interpreter {
    use super::*;

    // Stand-in interpreter: prints a CGI header block, then the
    // variables it was given and whatever arrived on stdin.
    const SCRIPT: &str = r#"
printf 'Content-type: text/html\r\n\r\n'
printf '%s|%s|%s|' "$REQUEST_METHOD" "$QUERY_STRING" "$CONTENT_LENGTH"
if [ "$REQUEST_METHOD" = "POST" ]; then cat; fi
"#;

    fn shell(script: &str) -> CgiInvoker {
        CgiInvoker::with_args("/bin/sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_get_invocation_strips_headers() {
        let req = request(Method::GET, "/page.php?a=1", b"");
        let body = shell(SCRIPT).invoke(&req, "/srv/www/page.php").await.unwrap();

        assert_eq!(body, b"GET|a=1||".to_vec());
    }

    #[tokio::test]
    async fn test_post_invocation_pipes_body() {
        let req = request(Method::POST, "/form.php", b"x=1&y=2");
        let body = shell(SCRIPT).invoke(&req, "/srv/www/form.php").await.unwrap();

        assert_eq!(body, b"POST||7|x=1&y=2".to_vec());
    }

    #[tokio::test]
    async fn test_environment_does_not_leak_between_calls() {
        let invoker = shell(SCRIPT);

        let post = request(Method::POST, "/form.php", b"abc");
        invoker.invoke(&post, "/srv/www/form.php").await.unwrap();

        let get = request(Method::GET, "/page.php", b"");
        let body = invoker.invoke(&get, "/srv/www/page.php").await.unwrap();

        assert_eq!(body, b"GET|||".to_vec());
        assert!(std::env::var("REQUEST_METHOD").is_err());
    }

    #[tokio::test]
    async fn test_script_filename_is_passed() {
        let req = request(Method::GET, "/page.php", b"");
        let body = shell("printf '\r\n\r\n%s' \"$SCRIPT_FILENAME\"")
            .invoke(&req, "/srv/www/page.php")
            .await
            .unwrap();

        assert_eq!(body, b"/srv/www/page.php".to_vec());
    }

    #[tokio::test]
    async fn test_failing_interpreter_is_an_error() {
        let req = request(Method::GET, "/page.php", b"");
        assert!(shell("exit 3").invoke(&req, "/srv/www/page.php").await.is_err());
    }
}
