use std::time::Duration;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use promptcall::app::{failure_report, run_questions, run_title};
use promptcall::{pair_answers, ClientConfig, Error, ErrorKind
  , PromptCompletionClient, RequestMode, ResourceDir};

fn chat_config(server: &MockServer) -> ClientConfig
{   let mut config = ClientConfig::new("test-key", RequestMode::Chat);
    config.api_base = server.uri();
    config
}

fn chat_body(content: &str) -> Value
{   json!({
      "choices": [
        { "message": { "role": "assistant", "content": content }
        , "finish_reason": "stop"
        }
      ]
    })
}

#[tokio::test]
async fn test_chat_reply_split_into_ordered_lines()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(chat_body("Line1\nLine2"))
      )
      .expect(1)
      .mount(&server)
      .await;

    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let answers = client.send_completion("two questions").await
      .unwrap();

    assert_eq!(answers, vec!["Line1".to_string(), "Line2".to_string()]);
}

#[tokio::test]
async fn test_bare_content_reply_without_role()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(200).set_body_raw(
          r#"{"choices":[{"message":{"content":"Line1\nLine2"}}]}"#,
          "application/json"
        )
      )
      .expect(1)
      .mount(&server)
      .await;

    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let answers = client.send_completion("q").await.unwrap();

    assert_eq!(answers, vec!["Line1".to_string(), "Line2".to_string()]);
}

#[tokio::test]
async fn test_null_content_reports_parse_error()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(200).set_body_raw(
          r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
          "application/json"
        )
      )
      .mount(&server)
      .await;

    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let err = client.send_completion("q").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_chat_mode_does_not_read_text_field()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(json!({ "choices": [{ "text": "legacy" }] }))
      )
      .mount(&server)
      .await;

    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let err = client.complete_text("q").await.unwrap_err();
    assert_eq!(
      err,
      Error::ParseError("first choice has no message.content".to_string())
    );
}

#[tokio::test]
async fn test_request_carries_bearer_token_and_json_body()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .and(header("Authorization", "Bearer test-key"))
      .and(header("Content-Type", "application/json"))
      .and(body_partial_json(json!({
        "model": "gpt-3.5-turbo",
        "max_tokens": 256,
        "messages": [{ "role": "user", "content": "Say hello\nthen stop" }]
      })))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(chat_body("hello"))
      )
      .expect(1)
      .mount(&server)
      .await;

    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let text = client.complete_text("Say hello\nthen stop").await
      .unwrap();
    assert_eq!(text, "hello");
}

#[tokio::test]
async fn test_system_prompt_sent_first()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(chat_body("ok"))
      )
      .mount(&server)
      .await;

    let mut config = chat_config(&server);
    config.system_prompt = Some("You write titles.".to_string());
    let client = PromptCompletionClient::new(config).unwrap();
    client.complete_text("title this").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "You write titles.");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "title this");
}

#[tokio::test]
async fn test_completion_mode_reads_text_field()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/completions"))
      .and(body_partial_json(json!({
        "model": "babbage-002",
        "max_tokens": 50,
        "prompt": "Extract the title of the following text:\n\nsome text"
      })))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({
          "choices": [{ "text": "\n\n  The Great Gatsby  \n" }]
        }))
      )
      .expect(1)
      .mount(&server)
      .await;

    let mut config = ClientConfig::new("test-key", RequestMode::Completion);
    config.api_base = server.uri();
    let client = PromptCompletionClient::new(config).unwrap();

    let prompt = promptcall::prompt::title_extraction_prompt("some text");
    let title = client.complete_text(&prompt).await.unwrap();
    assert_eq!(title, "The Great Gatsby");

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert!(body.get("messages").is_none());
}

#[tokio::test]
async fn test_unauthorized_reports_remote_error()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(401)
          .set_body_string(r#"{"error":"invalid key"}"#)
      )
      .mount(&server)
      .await;

    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let err = client.send_completion("hi").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status(), Some(401));
    assert_eq!(
      err,
      Error::ApiError
      {   status: 401
        , body: r#"{"error":"invalid key"}"#.to_string()
      }
    );
}

#[tokio::test]
async fn test_non_200_success_status_is_remote_error()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
      .mount(&server)
      .await;

    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let err = client.send_completion("hi").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status(), Some(202));
}

#[tokio::test]
async fn test_timeout_reports_transport_error()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(chat_body("late"))
          .set_delay(Duration::from_secs(5))
      )
      .mount(&server)
      .await;

    let mut config = chat_config(&server);
    config.timeout_secs = Some(1);
    let client = PromptCompletionClient::new(config).unwrap();
    let err = client.send_completion("hi").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_refused_connection_reports_transport_error()
{   let port = {
      let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
      listener.local_addr().unwrap().port()
    };

    let mut config = ClientConfig::new("test-key", RequestMode::Chat);
    config.api_base = format!("http://127.0.0.1:{}", port);
    let client = PromptCompletionClient::new(config).unwrap();
    let err = client.send_completion("hi").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_invalid_json_reports_parse_error()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(200).set_body_string("<html>oops</html>")
      )
      .mount(&server)
      .await;

    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let err = client.send_completion("hi").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_missing_choices_reports_parse_error()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({ "choices": [] }))
      )
      .mount(&server)
      .await;

    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let err = client.send_completion("hi").await.unwrap_err();
    assert_eq!(err, Error::NoChoicesInResponse);
    assert_eq!(err.kind(), ErrorKind::Parse);

    server.reset().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({ "id": "x" }))
      )
      .mount(&server)
      .await;
    let err = client.send_completion("hi").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_empty_api_key_never_reaches_network()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("x")))
      .expect(0)
      .mount(&server)
      .await;

    let mut config = ClientConfig::new("   ", RequestMode::Chat);
    config.api_base = server.uri();
    let err = PromptCompletionClient::new(config).err().unwrap();
    assert_eq!(err, Error::MissingApiKey);
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = ClientConfig::from_lookup(|key| match key
    {   "API_BASE" => Some(server.uri())
      , _ => None
    }).unwrap_err();
    assert_eq!(err, Error::MissingApiKey);

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fewer_answers_than_questions_is_not_hidden()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(chat_body("Reading files\r\n\r\nHanging clients\n"))
      )
      .mount(&server)
      .await;

    let questions = vec![
      "How do I read a file?".to_string(),
      "Why does my client hang?".to_string(),
      "Chat or completion?".to_string(),
    ];
    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let answers = client.send_completion("q").await.unwrap();
    assert_eq!(answers, vec!["Reading files", "Hanging clients"]);

    let pairing = pair_answers(&questions, &answers);
    assert!(!pairing.is_complete());
    assert_eq!(pairing.missing_count(), 1);
    assert_eq!(pairing.answered[2].index, 3);
    assert_eq!(pairing.answered[2].answer, None);
}

fn write_resources(dir: &std::path::Path)
{   std::fs::write(dir.join("goal.txt"), "Title each question.").unwrap();
    std::fs::write(dir.join("constraints.txt"), "One per line.").unwrap();
    std::fs::write(dir.join("steps.txt"), "Read, then title.").unwrap();
    std::fs::write(dir.join("questions.txt"), "Why?\nHow?\n").unwrap();
}

#[tokio::test]
async fn test_questions_flow_prints_prompt_then_numbered_answers()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(chat_body("Reasons\nMethods"))
      )
      .expect(1)
      .mount(&server)
      .await;

    let tmp = tempfile::tempdir().unwrap();
    write_resources(tmp.path());
    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let outcome = run_questions(&client, &ResourceDir::new(tmp.path()))
      .await
      .unwrap();

    assert!(outcome.pairing.is_complete());
    assert_eq!(
      outcome.stdout_lines(),
      vec![
        "goal:\nTitle each question.\n\n\
         constraints:\nOne per line.\n\n\
         steps:\nRead, then title.\n\n\
         questions:\nWhy?\nHow?\n\n".to_string(),
        "1. Reasons".to_string(),
        "2. Methods".to_string(),
      ]
    );
}

#[tokio::test]
async fn test_questions_flow_failure_prints_sentinel()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(401)
          .set_body_string(r#"{"error":"invalid key"}"#)
      )
      .mount(&server)
      .await;

    let tmp = tempfile::tempdir().unwrap();
    write_resources(tmp.path());
    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let err = run_questions(&client, &ResourceDir::new(tmp.path()))
      .await
      .unwrap_err();

    let report = failure_report(&err);
    assert_eq!(report.stdout, "error occurred");
    assert_eq!(
      report.stderr,
      r#"Error: API error (401): {"error":"invalid key"}"#
    );
}

#[tokio::test]
async fn test_questions_flow_missing_fragment_never_sends()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("x")))
      .expect(0)
      .mount(&server)
      .await;

    let tmp = tempfile::tempdir().unwrap();
    write_resources(tmp.path());
    std::fs::remove_file(tmp.path().join("steps.txt")).unwrap();
    let client = PromptCompletionClient::new(chat_config(&server))
      .unwrap();
    let err = run_questions(&client, &ResourceDir::new(tmp.path()))
      .await
      .unwrap_err();

    assert_eq!(err, Error::ResourceNotFound("steps.txt".to_string()));
    assert_eq!(failure_report(&err).stdout, "error occurred");
}

#[tokio::test]
async fn test_title_flow_output()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/completions"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(json!({ "choices": [{ "text": " Moby Dick\n" }] }))
      )
      .mount(&server)
      .await;

    let mut config = ClientConfig::new("test-key", RequestMode::Completion);
    config.api_base = server.uri();
    let client = PromptCompletionClient::new(config).unwrap();
    assert_eq!(client.config().model, "babbage-002");

    let outcome = run_title(&client, "Call me Ishmael.").await.unwrap();
    assert_eq!(
      outcome.stdout_lines(),
      vec![
        "Extract the title of the following text:\n\nCall me Ishmael."
          .to_string(),
        String::new(),
        "Moby Dick".to_string(),
      ]
    );
}
