use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{Instrument, info, info_span, warn};

use crate::bridge_config::BridgeConfig;
use crate::errors::BridgeError;
use crate::frame_channel::{FrameReader, FrameWriter};
use crate::request_translator::RequestTranslator;
use crate::types::OutboundMessage;

/// Request/response loop between the extension and the media server.
///
/// Frames are handled strictly one at a time, so replies come back in the
/// order the requests arrived.
pub struct Bridge<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    translator: RequestTranslator,
    answered: u64,
}

impl<R, W> Bridge<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, config: BridgeConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            reader: FrameReader::new(input, config.max_frame_size),
            writer: FrameWriter::new(output),
            translator: RequestTranslator::new(config)?,
            answered: 0,
        })
    }

    /// Answers frames until the input ends, returning how many were answered.
    ///
    /// Only a failure to write a reply stops the loop early.
    pub async fn run(&mut self) -> Result<u64, BridgeError> {
        info!("Bridge started, waiting for messages");
        loop {
            let seq = self.answered + 1;
            let Some(response) = self
                .next_response()
                .instrument(info_span!("request", seq))
                .await
            else {
                info!("Input closed after {} messages", self.answered);
                return Ok(self.answered);
            };

            self.writer
                .write_message(&response)
                .await
                .map_err(BridgeError::Write)?;
            self.answered += 1;
        }
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.writer.into_inner()
    }

    /// Reads one frame and works out its reply. `None` once the input has ended.
    async fn next_response(&mut self) -> Option<OutboundMessage> {
        let message = match self.reader.read_message().await {
            Ok(Some(message)) => message,
            Ok(None) => return None,
            Err(err) => {
                warn!("Failed to read message: {}", err);
                return Some(OutboundMessage::error(format!(
                    "Failed to read message: {}",
                    err
                )));
            }
        };

        if message.url.is_empty() {
            warn!("Rejected message without url");
            return Some(OutboundMessage::error("'url' required"));
        }

        let response = self.translator.forward(message).await;
        if response.is_ok() {
            info!("Forwarded, server answered {:?}", response.code);
        } else {
            warn!(
                "Request failed: {}",
                response.message.as_deref().unwrap_or("unknown error")
            );
        }
        Some(response)
    }
}
