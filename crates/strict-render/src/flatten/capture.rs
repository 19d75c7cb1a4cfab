//! Captures any `Serialize` value as a [`Node`] tree.
//!
//! The serializer keeps the distinctions the template engine cannot see
//! (struct vs. map, `Some` vs. the value itself) while formatting every scalar
//! with [`format_scalar`], the same form templates print.

use std::fmt;

use minijinja::Value;
use serde::ser::{self, Serialize};

use super::{Field, Node, Visibility};
use crate::format::format_scalar;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct CaptureError(String);

impl ser::Error for CaptureError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CaptureError(msg.to_string())
    }
}

pub(crate) fn capture<T: Serialize + ?Sized>(value: &T) -> Result<Node, CaptureError> {
    value.serialize(Capture)
}

fn scalar(value: impl Into<Value>) -> Result<Node, CaptureError> {
    Ok(Node::Scalar(format_scalar(&value.into())))
}

fn field_visibility(name: &str) -> Visibility {
    if name.starts_with('_') {
        Visibility::Internal
    } else {
        Visibility::Exported
    }
}

struct Capture;

impl ser::Serializer for Capture {
    type Ok = Node;
    type Error = CaptureError;

    type SerializeSeq = SeqCapture;
    type SerializeTuple = SeqCapture;
    type SerializeTupleStruct = SeqCapture;
    type SerializeTupleVariant = VariantCapture<SeqCapture>;
    type SerializeMap = MapCapture;
    type SerializeStruct = RecordCapture;
    type SerializeStructVariant = VariantCapture<RecordCapture>;

    fn serialize_bool(self, v: bool) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i8(self, v: i8) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_char(self, v: char) -> Result<Node, CaptureError> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node, CaptureError> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node, CaptureError> {
        Ok(Node::Scalar(String::from_utf8_lossy(v).into_owned()))
    }

    fn serialize_none(self) -> Result<Node, CaptureError> {
        Ok(Node::Reference(None))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Node, CaptureError> {
        Ok(Node::Reference(Some(Box::new(value.serialize(Capture)?))))
    }

    fn serialize_unit(self) -> Result<Node, CaptureError> {
        Ok(Node::null())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node, CaptureError> {
        Ok(Node::null())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node, CaptureError> {
        Ok(Node::Scalar(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node, CaptureError> {
        Ok(Node::Reference(Some(Box::new(value.serialize(Capture)?))))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node, CaptureError> {
        Ok(Node::Mapping(vec![(
            Node::Scalar(variant.to_string()),
            value.serialize(Capture)?,
        )]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqCapture, CaptureError> {
        Ok(SeqCapture {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqCapture, CaptureError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqCapture, CaptureError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantCapture<SeqCapture>, CaptureError> {
        Ok(VariantCapture {
            variant,
            inner: self.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapCapture, CaptureError> {
        Ok(MapCapture {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<RecordCapture, CaptureError> {
        Ok(RecordCapture {
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantCapture<RecordCapture>, CaptureError> {
        Ok(VariantCapture {
            variant,
            inner: self.serialize_struct(name, len)?,
        })
    }
}

pub(crate) struct SeqCapture {
    items: Vec<Node>,
}

impl ser::SerializeSeq for SeqCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.items.push(value.serialize(Capture)?);
        Ok(())
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(Node::Sequence(self.items))
    }
}

impl ser::SerializeTuple for SeqCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        ser::SerializeSeq::end(self)
    }
}

pub(crate) struct MapCapture {
    entries: Vec<(Node, Node)>,
    pending_key: Option<Node>,
}

impl ser::SerializeMap for MapCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), CaptureError> {
        self.pending_key = Some(key.serialize(Capture)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| CaptureError("map value serialized before its key".to_string()))?;
        self.entries.push((key, value.serialize(Capture)?));
        Ok(())
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(Node::Mapping(self.entries))
    }
}

pub(crate) struct RecordCapture {
    fields: Vec<Field>,
}

impl ser::SerializeStruct for RecordCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CaptureError> {
        self.fields.push(Field {
            name: key.to_string(),
            value: value.serialize(Capture)?,
            visibility: field_visibility(key),
        });
        Ok(())
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(Node::Record(self.fields))
    }
}

/// Wraps a tuple or struct variant body in a one-entry mapping keyed by the
/// variant name, the same shape the engine gives it.
pub(crate) struct VariantCapture<T> {
    variant: &'static str,
    inner: T,
}

impl VariantCapture<SeqCapture> {
    fn finish(self) -> Result<Node, CaptureError> {
        let body = ser::SerializeSeq::end(self.inner)?;
        Ok(Node::Mapping(vec![(Node::Scalar(self.variant.to_string()), body)]))
    }
}

impl ser::SerializeTupleVariant for VariantCapture<SeqCapture> {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for VariantCapture<RecordCapture> {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CaptureError> {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        let body = ser::SerializeStruct::end(self.inner)?;
        Ok(Node::Mapping(vec![(Node::Scalar(self.variant.to_string()), body)]))
    }
}
