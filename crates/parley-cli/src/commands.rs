//! Command execution.

use std::{error::Error, io::Write};

use parley_client::{
    ClientError, ConversationCipher, ConversationId, Environment, KeyStore, MessageOutcome,
};

use crate::cli::{Command, KeysCommand};

/// Run `command`, writing user-facing output to `out`.
///
/// A message that cannot be decrypted prints its fallback text and still
/// returns the error, so the process exits non-zero.
pub async fn execute<S, E, W>(
    command: Command,
    cipher: &ConversationCipher<S, E>,
    out: &mut W,
) -> Result<(), Box<dyn Error>>
where
    S: KeyStore,
    E: Environment,
    W: Write,
{
    match command {
        Command::Encrypt { conversation, text } => {
            let id = conversation_id(conversation)?;
            let envelope = cipher.encrypt_for_conversation(&id, &text).await?;
            writeln!(out, "{envelope}")?;
        },
        Command::Decrypt { conversation, envelope } => {
            let id = conversation_id(conversation)?;
            match cipher.decrypt_for_conversation(&id, &envelope).await {
                Ok(text) => writeln!(out, "{text}")?,
                Err(ClientError::Cipher(e)) if e.is_message_local() => {
                    let outcome = MessageOutcome::Undecryptable { reason: e.clone().into() };
                    writeln!(out, "{}", outcome.display_text())?;
                    return Err(ClientError::Cipher(e).into());
                },
                Err(e) => return Err(e.into()),
            }
        },
        Command::Keys(KeysCommand::List) => {
            let mut ids = cipher.keys().store().conversation_ids()?;
            ids.sort();
            for id in ids {
                writeln!(out, "{id}")?;
            }
        },
        Command::Keys(KeysCommand::Forget { conversation }) => {
            let id = conversation_id(conversation)?;
            if cipher.keys().forget(&id).await? {
                writeln!(out, "forgot key for {id}")?;
            } else {
                writeln!(out, "no key stored for {id}")?;
            }
        },
        Command::Keys(KeysCommand::Clear) => {
            let removed = cipher.keys().store().clear()?;
            tracing::info!(removed, "cleared key store");
            writeln!(out, "removed {removed} keys")?;
        },
    }

    Ok(())
}

fn conversation_id(raw: String) -> Result<ConversationId, ClientError> {
    Ok(ConversationId::new(raw)?)
}
