mod request_decode {
    use pretty_assertions::assert_eq;
    use sans_h1::{Method, ParseError, ParseStatus, Request, RequestParser};

    /// Feeds a request byte by byte, asserting `Processing` for every byte
    /// except the last, which must complete the request. Fixture newlines
    /// are written as `\n` and expanded to CRLF.
    fn decode_str(wire: &str) -> Request {
        let wire = wire.replace('\n', "\r\n");
        let mut parser = RequestParser::new();
        let mut request = Request::new();
        let bytes = wire.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            let status = parser.consume(&mut request, byte).expect("parse error");
            if i + 1 < bytes.len() {
                assert_eq!(status, ParseStatus::Processing, "at byte {}", i);
            } else {
                assert_eq!(status, ParseStatus::Complete, "at final byte");
            }
        }
        request
    }

    /// Feeds bytes until the first error, panicking if none occurs.
    fn decode_err(wire: &str) -> ParseError {
        let wire = wire.replace('\n', "\r\n");
        let mut parser = RequestParser::new();
        let mut request = Request::new();
        for &byte in wire.as_bytes() {
            if let Err(err) = parser.consume(&mut request, byte) {
                return err;
            }
        }
        panic!("expected a parse error for {:?}", wire);
    }

    #[test]
    fn post_with_body() {
        let request = decode_str(
            "POST /submit HTTP/1.1\n\
             host: localhost:8080\n\
             content-length: 5\n\
             content-type: text/plain;charset=utf-8\n\
             Another-Header: header value\n\
             another-header: other header value\n\
             \n\
             hello",
        );

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.method_string, "POST");
        assert_eq!(request.url, "/submit");
        assert_eq!(request.version_major, 1);
        assert_eq!(request.version_minor, 1);
        assert_eq!(request.version_string, "1.1");
        assert_eq!(request.host, "localhost:8080");
        assert_eq!(request.content_type, "text/plain;charset=utf-8");
        assert_eq!(request.content_length, 5);
        assert_eq!(request.data, b"hello".to_vec());

        // wire order, original case, duplicates kept
        let expected: Vec<(String, String)> = vec![
            ("host".into(), "localhost:8080".into()),
            ("content-length".into(), "5".into()),
            ("content-type".into(), "text/plain;charset=utf-8".into()),
            ("Another-Header".into(), "header value".into()),
            ("another-header".into(), "other header value".into()),
        ];
        assert_eq!(request.headers, expected);

        assert!(!request.keep_alive);
        assert_eq!(request.connection_timeout, 15);
    }

    #[test]
    fn get_without_body_completes_on_header_terminator() {
        let request = decode_str(
            "GET /index.html HTTP/1.1\n\
             Host: example.org\n\
             Content-Length: 0\n\
             \n",
        );
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "/index.html");
        assert_eq!(request.host, "example.org");
        assert_eq!(request.content_length, 0);
        assert!(request.data.is_empty());
    }

    #[test]
    fn unknown_method_is_custom_not_an_error() {
        let request = decode_str(
            "FROB /thing HTTP/1.1\n\
             Content-Length: 0\n\
             \n",
        );
        assert_eq!(request.method, Method::Custom);
        assert_eq!(request.method_string, "FROB");
    }

    #[test]
    fn zero_header_request_is_accepted() {
        let wire = "GET / HTTP/1.1\r\n\r\n";
        let mut parser = RequestParser::new();
        let mut request = Request::new();
        for &byte in wire.as_bytes() {
            assert_eq!(
                parser.consume(&mut request, byte).unwrap(),
                ParseStatus::Processing
            );
        }
        // no content-length: the parser is waiting in the body state
        assert!(parser.finalize(&mut request));
        assert_eq!(request.url, "/");
        assert!(request.data.is_empty());
    }

    #[test]
    fn unknown_length_body_accumulates_without_completing() {
        let head = "POST /upload HTTP/1.1\r\nHost: a\r\n\r\n";
        let mut parser = RequestParser::new();
        let mut request = Request::new();
        for &byte in head.as_bytes() {
            assert_eq!(
                parser.consume(&mut request, byte).unwrap(),
                ParseStatus::Processing
            );
        }
        // bounded stand-in for "indefinitely"
        for _ in 0..1000 {
            assert_eq!(
                parser.consume(&mut request, b'x').unwrap(),
                ParseStatus::Processing
            );
        }
        assert_eq!(request.content_length, -1);

        assert!(parser.finalize(&mut request));
        assert_eq!(request.data, vec![b'x'; 1000]);
    }

    #[test]
    fn finalize_outside_a_body_discards_the_partial_parse() {
        let mut parser = RequestParser::new();
        let mut request = Request::new();
        for &byte in b"GET /half".iter() {
            parser.consume(&mut request, byte).unwrap();
        }
        assert!(!parser.finalize(&mut request));
        assert!(request.data.is_empty());
    }

    #[test]
    fn pipelined_requests_are_independent() {
        let first = "POST /one HTTP/1.1\n\
                     Host: first.example\n\
                     Content-Length: 3\n\
                     X-First: yes\n\
                     \n\
                     abc"
            .replace('\n', "\r\n");
        let second = "GET /two HTTP/1.0\n\
                      Content-Length: 0\n\
                      \n"
            .replace('\n', "\r\n");

        let mut parser = RequestParser::new();
        let mut request = Request::new();
        let mut completed = Vec::new();
        for &byte in first.as_bytes().iter().chain(second.as_bytes()) {
            if parser.consume(&mut request, byte).unwrap() == ParseStatus::Complete {
                completed.push(request.clone());
            }
        }
        assert_eq!(completed.len(), 2);

        assert_eq!(completed[0].url, "/one");
        assert_eq!(completed[0].host, "first.example");
        assert_eq!(completed[0].content_length, 3);
        assert_eq!(completed[0].data, b"abc".to_vec());
        assert_eq!(completed[0].version_minor, 1);

        // no residue from the first request
        assert_eq!(completed[1].url, "/two");
        assert_eq!(completed[1].host, "");
        assert_eq!(completed[1].content_length, 0);
        assert!(completed[1].data.is_empty());
        assert_eq!(completed[1].version_minor, 0);
        assert_eq!(completed[1].headers.len(), 1);
    }

    #[test]
    fn connection_and_keep_alive_headers() {
        let request = decode_str(
            "GET / HTTP/1.1\n\
             Connection: Keep-Alive\n\
             Keep-Alive: timeout=30\n\
             Content-Length: 0\n\
             \n",
        );
        assert!(request.keep_alive);
        assert_eq!(request.connection_timeout, 30);

        let request = decode_str(
            "GET / HTTP/1.1\n\
             Connection: close\n\
             Content-Length: 0\n\
             \n",
        );
        assert!(!request.keep_alive);
        assert_eq!(request.connection_timeout, 15);
    }

    #[test]
    fn unparseable_keep_alive_timeout_is_ignored() {
        let request = decode_str(
            "GET / HTTP/1.1\n\
             Keep-Alive: timeout=soon\n\
             Content-Length: 0\n\
             \n",
        );
        assert_eq!(request.connection_timeout, 15);

        // no '=' at all: also ignored
        let request = decode_str(
            "GET / HTTP/1.1\n\
             Keep-Alive: forever\n\
             Content-Length: 0\n\
             \n",
        );
        assert_eq!(request.connection_timeout, 15);
    }

    #[test]
    fn duplicate_host_headers_last_wins() {
        let request = decode_str(
            "GET / HTTP/1.1\n\
             Host: old.example\n\
             Host: new.example\n\
             Content-Length: 0\n\
             \n",
        );
        assert_eq!(request.host, "new.example");
        assert_eq!(request.headers.len(), 3);
    }

    #[test]
    fn header_value_leading_spaces_are_skipped() {
        let request = decode_str(
            "GET / HTTP/1.1\n\
             Host:     spaced.example\n\
             X-Tight:nospace\n\
             X-Pad: padded  \n\
             Content-Length: 0\n\
             \n",
        );
        assert_eq!(request.host, "spaced.example");
        assert_eq!(request.headers[1], ("X-Tight".to_string(), "nospace".to_string()));
        // trailing spaces belong to the value
        assert_eq!(request.headers[2], ("X-Pad".to_string(), "padded  ".to_string()));
    }

    #[test]
    fn empty_header_value() {
        let request = decode_str(
            "GET / HTTP/1.1\n\
             X-Empty:\n\
             Content-Length: 0\n\
             \n",
        );
        assert_eq!(request.headers[0], ("X-Empty".to_string(), String::new()));
    }

    #[test]
    fn lf_lf_header_line_terminator_accepted() {
        // header lines only need two newline-class bytes; the request line
        // and the blank line require exact CRLF
        let wire = b"GET / HTTP/1.1\r\nContent-Length: 0\n\n\r\n";
        let mut parser = RequestParser::new();
        let mut request = Request::new();
        let mut last = ParseStatus::Processing;
        for &byte in wire.iter() {
            last = parser.consume(&mut request, byte).unwrap();
        }
        assert_eq!(last, ParseStatus::Complete);
        assert_eq!(request.content_length, 0);
    }

    #[test]
    fn malformed_inputs_error() {
        assert_eq!(
            decode_err("GET / HTTP/1.1\nContent-Length: five\n\n"),
            ParseError::InvalidContentLength
        );
        assert_eq!(
            decode_err("GET / HTTP/1.1\nContent-Length: -5\n\n"),
            ParseError::InvalidContentLength
        );
        assert_eq!(
            decode_err("GET / HTTP/1.1\nBad Key: x\n\n"),
            ParseError::InvalidHeaderKey
        );
        assert_eq!(decode_err("g"), ParseError::InvalidMethod);
        assert_eq!(decode_err("GET / PTTH/1.1\n\n"), ParseError::InvalidHttpLiteral);
        assert_eq!(decode_err("GET / HTTP/1.1.1\n\n"), ParseError::InvalidVersion);
    }

    #[test]
    fn reset_recovers_a_failed_parser() {
        let mut parser = RequestParser::new();
        let mut request = Request::new();
        let mut failed = false;
        for &byte in b"GET / WHAT/1.1\r\n".iter() {
            if parser.consume(&mut request, byte).is_err() {
                failed = true;
                break;
            }
        }
        assert!(failed);

        parser.reset(&mut request);
        let wire = "GET /ok HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
        let mut last = ParseStatus::Processing;
        for &byte in wire.as_bytes() {
            last = parser.consume(&mut request, byte).unwrap();
        }
        assert_eq!(last, ParseStatus::Complete);
        assert_eq!(request.url, "/ok");
    }
}
