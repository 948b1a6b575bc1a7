use std::time::Duration;

use greet_rpc::{
    body::Body,
    client::{
        transport::{
            mock::{new_mock_channels, Mock, MockError},
            TransportRequest, TransportResponse,
        },
        Client,
    },
    exports::{
        futures_util::{stream, StreamExt},
        http::HeaderValue,
        tower::util::MapRequestLayer,
    },
    proto::*,
    service::{GreetServiceClient, GREET_PATH, LONG_GREET_PATH},
    ClientError, Code, Request, Status,
};

fn hello(greeting: Option<Greeting>) -> String {
    let greeting = greeting.unwrap_or_default();
    format!("Hello, {} {}!", greeting.first_name, greeting.last_name)
}

async fn echo(req: TransportRequest) -> Result<TransportResponse, Status> {
    match &*req.endpoint {
        GREET_PATH => {
            let req: GreetRequest = req.body.into_message().await?;
            let resp = GreetResponse::new(hello(req.greeting));
            Ok(TransportResponse::new(Body::message(&resp)))
        }
        LONG_GREET_PATH => {
            let mut messages = req.body.into_messages::<LongGreetRequest>();
            let mut result = String::new();
            while let Some(req) = messages.next().await {
                result.push_str(&hello(req?.greeting));
            }
            Ok(TransportResponse::new(Body::message(&LongGreetResponse::new(result))))
        }
        path => Err(Status::new(Code::Unimplemented).with_message(path)),
    }
}

fn spawn_echo() -> GreetServiceClient<Mock> {
    let (tx, rx) = new_mock_channels();
    tokio::spawn(rx.serve(echo));
    GreetServiceClient::new_transport(Mock::new(tx))
}

#[tokio::test]
async fn greet_echoes_names() {
    let mut client = spawn_echo();

    let resp = client
        .greet(GreetRequest::from(Greeting::new("Peter", "Yocum")))
        .await
        .expect("call succeeds");

    assert_eq!(resp.into_message().result, "Hello, Peter Yocum!");
}

#[tokio::test]
async fn empty_names_are_passed_through() {
    let mut client = spawn_echo();

    let resp = client
        .greet(GreetRequest::from(Greeting::new("", "Yocum")))
        .await
        .expect("call succeeds");

    assert_eq!(resp.into_message().result, "Hello,  Yocum!");
}

#[tokio::test]
async fn missing_greeting_is_passed_through() {
    let mut client = spawn_echo();

    let resp = client
        .greet(GreetRequest { greeting: None })
        .await
        .expect("call succeeds");

    assert_eq!(resp.into_message().result, "Hello,  !");
}

#[tokio::test]
async fn long_greet_combines_greetings() {
    let mut client = spawn_echo();

    let requests = stream::iter(vec![
        LongGreetRequest::from(Greeting::new("Peter", "Yocum")),
        LongGreetRequest::from(Greeting::new("Ada", "Lovelace")),
    ]);
    let resp = client
        .long_greet(Request::new(requests))
        .await
        .expect("call succeeds");

    assert_eq!(
        resp.into_message().result,
        "Hello, Peter Yocum!Hello, Ada Lovelace!"
    );
}

#[tokio::test]
async fn unknown_method_is_remote_call() {
    let mut client = spawn_echo();

    let err = client
        .greet_everyone(Request::new(stream::iter(Vec::<GreetEveryoneRequest>::new())))
        .await
        .unwrap_err();

    assert!(err.is_remote_call());
    assert_eq!(
        err.status().map(|status| status.code()),
        Some(Code::Unimplemented)
    );
}

#[tokio::test]
async fn missing_response_message_is_internal() {
    let (tx, rx) = new_mock_channels();
    tokio::spawn(rx.serve(|_| async { Ok(TransportResponse::new(Body::empty())) }));
    let mut client = GreetServiceClient::new_transport(Mock::new(tx));

    let err = client
        .greet(GreetRequest::from(Greeting::new("Peter", "Yocum")))
        .await
        .unwrap_err();

    assert_eq!(
        err.status().map(|status| status.code()),
        Some(Code::Internal)
    );
}

#[tokio::test]
async fn status_after_message_fails_the_call() {
    let (tx, rx) = new_mock_channels();
    tokio::spawn(rx.serve(|_| async {
        let body = Body::message(&GreetResponse::new("Hello, Peter Yocum!"))
            .chain(Body::status(Status::new(Code::DataLoss)));
        Ok(TransportResponse::new(body))
    }));
    let mut client = GreetServiceClient::new_transport(Mock::new(tx));

    let err = client
        .greet(GreetRequest::from(Greeting::new("Peter", "Yocum")))
        .await
        .unwrap_err();

    assert_eq!(
        err.status().map(|status| status.code()),
        Some(Code::DataLoss)
    );
}

#[tokio::test]
async fn dropped_server_is_connection_error() {
    let (tx, rx) = new_mock_channels();
    drop(rx);
    let mut client = GreetServiceClient::new_transport(Mock::new(tx));

    let err = client
        .greet(GreetRequest::from(Greeting::new("Peter", "Yocum")))
        .await
        .unwrap_err();

    assert!(err.is_connection());
}

#[tokio::test]
async fn unanswered_request_exceeds_deadline() {
    let (tx, rx) = new_mock_channels();
    tokio::spawn(rx.serve(|_| never_answer()));
    let mut client = GreetServiceClient::new_transport(Mock::new(tx));

    let err = client
        .greet(
            Request::new(GreetRequest::from(Greeting::new("Peter", "Yocum")))
                .with_timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.status().map(|status| status.code()),
        Some(Code::DeadlineExceeded)
    );
}

async fn never_answer() -> Result<TransportResponse, Status> {
    std::future::pending().await
}

#[tokio::test]
async fn dropped_request_is_transport_error() {
    let (tx, rx) = new_mock_channels();
    let mut client = GreetServiceClient::new_transport(Mock::new(tx));
    let call = client.greet(GreetRequest::from(Greeting::new("Peter", "Yocum")));
    tokio::pin!(call);

    // the first poll queues the request
    let pending = tokio::time::timeout(Duration::from_millis(10), &mut call).await;
    assert!(pending.is_err());
    drop(rx);

    let err = call.await.unwrap_err();
    assert!(
        matches!(err, ClientError::Transport(MockError::Receive)),
        "unexpected error: {}",
        err
    );
}

#[tokio::test]
async fn layers_can_add_metadata() {
    let (tx, rx) = new_mock_channels();
    tokio::spawn(rx.serve(|req| async move {
        let greeter = req
            .metadata
            .get("x-greeter")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        Ok(TransportResponse::new(Body::message(&GreetResponse::new(
            greeter,
        ))))
    }));

    let inner = Client::new(Mock::new(tx)).layer(MapRequestLayer::new(
        |mut req: TransportRequest| {
            req.metadata
                .insert("x-greeter", HeaderValue::from_static("mock"));
            req
        },
    ));
    let mut client = GreetServiceClient::new_inner(inner);

    let resp = client
        .greet(GreetRequest::from(Greeting::new("Peter", "Yocum")))
        .await
        .expect("call succeeds");

    assert_eq!(resp.into_message().result, "mock");
}
