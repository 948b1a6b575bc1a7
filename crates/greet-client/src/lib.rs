//! Calls `greet.GreetService/Greet` once and prints the greeting.

use std::io::Write;

use greet_rpc::{proto::Greeting, BoxError, GreetService};

/// The greeting this client sends.
pub fn default_greeting() -> Greeting {
    Greeting::new("Peter", "Yocum")
}

/// Greet [`default_greeting`] using `client` and write the result, followed
/// by a newline, to `out`.
///
/// Nothing is written if the call fails.
pub fn run<C, W>(client: &mut C, out: &mut W) -> Result<(), BoxError>
where
    C: GreetService,
    C::Error: Send + Sync + 'static,
    W: Write,
{
    let greeting = default_greeting();
    tracing::info!(
        first_name = %greeting.first_name,
        last_name = %greeting.last_name,
        "sending greeting"
    );

    let resp = client.greet(greeting)?;
    writeln!(out, "{}", resp.result)?;

    Ok(())
}
