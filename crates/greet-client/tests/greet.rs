use std::{net::TcpListener, thread};

use greet_client::{default_greeting, run};
use greet_rpc::{
    body::Body,
    client::transport::{
        http::HyperError,
        mock::{new_mock_channels, Mock},
        TransportResponse,
    },
    proto::{GreetRequest, GreetResponse},
    ClientConfig, ClientError, Code, GreetClient, Status,
};

fn mock_client<F>(answer: F) -> (GreetClient<Mock>, thread::JoinHandle<()>)
where
    F: Fn(GreetRequest) -> Result<GreetResponse, Status> + Send + 'static,
{
    let (tx, rx) = new_mock_channels();
    let server = thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let answer = &answer;
        runtime.block_on(rx.serve(move |req| {
            async move {
                let req = req.body.into_message().await?;
                answer(req).map(|resp| TransportResponse::new(Body::message(&resp)))
            }
        }));
    });
    let client = GreetClient::with_transport(&ClientConfig::default(), Mock::new(tx))
        .expect("client");

    (client, server)
}

#[test]
fn prints_greeting_for_peter_yocum() {
    let (mut client, server) = mock_client(|req| {
        let greeting = req.greeting.unwrap_or_default();
        Ok(GreetResponse::new(format!(
            "Hello, {} {}!",
            greeting.first_name, greeting.last_name
        )))
    });

    let mut out = Vec::new();
    run(&mut client, &mut out).expect("greeting succeeds");
    assert_eq!(String::from_utf8(out).unwrap(), "Hello, Peter Yocum!\n");

    drop(client);
    server.join().unwrap();
}

#[test]
fn sends_default_greeting_unchanged() {
    let (mut client, server) = mock_client(|req| {
        assert_eq!(req.greeting, Some(default_greeting()));
        Ok(GreetResponse::new("ok"))
    });

    let mut out = Vec::new();
    run(&mut client, &mut out).expect("greeting succeeds");
    assert_eq!(out, b"ok\n");

    drop(client);
    server.join().unwrap();
}

#[test]
fn remote_fault_prints_nothing() {
    let (mut client, server) =
        mock_client(|_| Err(Status::new(Code::InvalidArgument).with_message("no names")));

    let mut out = Vec::new();
    let err = run(&mut client, &mut out).unwrap_err();
    assert!(out.is_empty());

    let err = err
        .downcast::<ClientError<greet_rpc::client::transport::mock::MockError>>()
        .expect("client error");
    assert!(err.is_remote_call());
    assert_eq!(err.status().map(Status::code), Some(Code::InvalidArgument));

    drop(client);
    server.join().unwrap();
}

#[test]
fn unreachable_endpoint_prints_nothing() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let mut client = GreetClient::connect(ClientConfig::new(addr.to_string())).unwrap();
    let mut out = Vec::new();
    let err = run(&mut client, &mut out).unwrap_err();
    assert!(out.is_empty());

    let err = err
        .downcast::<ClientError<HyperError>>()
        .expect("client error");
    assert!(err.is_connection(), "unexpected error: {}", err);
}
