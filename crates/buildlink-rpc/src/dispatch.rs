use std::collections::HashMap;

use buildlink_msgpack::Value;

use crate::decode::parse_string;
use crate::envelope::Payload;
use crate::error::DecodeError;
use crate::path::Path;

/// Constructs one command's typed payload from the full body values and
/// the body's base path. Most commands read their argument array at
/// element 1; a few legacy commands consume the whole body.
pub type CommandDecoder<P> = fn(&[Value], &Path) -> Result<P, DecodeError>;

/// A protocol version's mapping from command name to payload constructor.
///
/// Built once per negotiated version at startup; the dispatch mechanism
/// itself is version-agnostic. Unrecognized names are the forward
/// compatibility seam: they decode to the payload's `unknown` variant so a
/// newer peer can send message kinds this catalog has never heard of.
pub struct DispatchTable<P> {
    commands: HashMap<&'static str, CommandDecoder<P>>,
}

impl<P: Payload> DispatchTable<P> {
    /// Build a table from `(name, decoder)` entries.
    pub fn new(entries: &[(&'static str, CommandDecoder<P>)]) -> Self {
        Self {
            commands: entries.iter().copied().collect(),
        }
    }

    /// Decode a body into a typed payload.
    ///
    /// Element 0 of the body must be the command-name string; a body
    /// without one fails with [`DecodeError::NameNotFound`]. A recognized
    /// name runs its decoder (whose field-level errors propagate); an
    /// unrecognized name yields the `unknown` payload, never an error.
    pub fn decode(&self, values: &[Value], path: &Path) -> Result<P, DecodeError> {
        let name =
            parse_string(values, &path.child(0)).map_err(|_| DecodeError::NameNotFound)?;

        match self.commands.get(name.as_str()) {
            Some(decoder) => decoder(values, path),
            None => Ok(P::unknown(values.to_vec())),
        }
    }

    /// True if `name` has a registered decoder.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
