//! Tree-only strategy: straight depth-first conversion, no identity tracking.

use crate::convert::{ConverterLookup, MarshalContext, UnmarshalContext};
use crate::identity::Handle;
use crate::stream::{StreamReader, StreamWriter};
use crate::StreamError;

pub(crate) fn marshal(
    item: &Handle,
    root_name: &str,
    writer: &mut dyn StreamWriter,
    lookup: &dyn ConverterLookup,
) -> Result<(), StreamError> {
    writer.start_node(root_name, None)?;
    let mut marshaller = TreeMarshaller { writer, lookup };
    marshaller.convert_another(item)?;
    marshaller.writer.end_node()
}

pub(crate) fn unmarshal(
    reader: &mut dyn StreamReader,
    lookup: &dyn ConverterLookup,
) -> Result<Handle, StreamError> {
    let mut unmarshaller = TreeUnmarshaller { reader, lookup };
    unmarshaller.convert_another(None)
}

struct TreeMarshaller<'a> {
    writer: &'a mut dyn StreamWriter,
    lookup: &'a dyn ConverterLookup,
}

impl MarshalContext for TreeMarshaller<'_> {
    fn writer(&mut self) -> &mut dyn StreamWriter {
        &mut *self.writer
    }

    fn convert_another(&mut self, item: &Handle) -> Result<(), StreamError> {
        let lookup = self.lookup;
        let converter = lookup.converter_for_type((**item).type_id())?;
        converter.marshal(item, self)
    }
}

struct TreeUnmarshaller<'a> {
    reader: &'a mut dyn StreamReader,
    lookup: &'a dyn ConverterLookup,
}

impl UnmarshalContext for TreeUnmarshaller<'_> {
    fn reader(&mut self) -> &mut dyn StreamReader {
        &mut *self.reader
    }

    fn convert_another(&mut self, _parent: Option<&Handle>) -> Result<Handle, StreamError> {
        let hint = self
            .reader
            .type_hint()
            .map(str::to_owned)
            .unwrap_or_else(|| self.reader.node_name().to_owned());
        let lookup = self.lookup;
        let converter = lookup.converter_for_hint(&hint)?;
        converter.unmarshal(self)
    }
}
