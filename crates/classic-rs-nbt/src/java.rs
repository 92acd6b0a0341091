//! The subset of Java object serialization needed for classic `.dat` maps.
//!
//! Only a single root object is read: its class descriptor, then the values
//! of its own fields in declared order. Superclass descriptors are parsed
//! and discarded. Object fields other than `blockMap` are never read, since
//! the producing server writes them after everything a map needs.

use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};
use classic_rs_proto::cp437;

use crate::error::NbtError;

/// Stream type codes.
pub mod tc {
    pub const NULL: u8 = 0x70;
    pub const REFERENCE: u8 = 0x71;
    pub const CLASSDESC: u8 = 0x72;
    pub const OBJECT: u8 = 0x73;
    pub const STRING: u8 = 0x74;
    pub const ARRAY: u8 = 0x75;
    pub const END_BLOCK_DATA: u8 = 0x78;
}

pub const STREAM_MAGIC: u16 = 0xACED;
pub const STREAM_VERSION: u16 = 0x0005;

const MAX_NAME_LEN: usize = 48;
const MAX_FIELDS: usize = 22;

#[derive(Debug, Clone, PartialEq)]
pub enum JavaValue {
    /// Not read: an object field we skip, or a null array.
    Unread,
    Int8(i8),
    Float32(f32),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct JavaField {
    /// Type code character: `B F I J Z [ L` are understood.
    pub type_code: u8,
    pub name: String,
    pub value: JavaValue,
}

impl JavaField {
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn int32(&self) -> Result<i32, NbtError> {
        match self.value {
            JavaValue::Int32(v) => Ok(v),
            _ => Err(NbtError::TypeMismatch {
                expected: "Int32",
                got: type_name(self.type_code),
            }),
        }
    }

    /// Takes the byte array payload, leaving [`JavaValue::Unread`] behind.
    pub fn take_bytes(&mut self) -> Result<Vec<u8>, NbtError> {
        if self.type_code != b'[' {
            return Err(NbtError::TypeMismatch {
                expected: "Array",
                got: type_name(self.type_code),
            });
        }
        match std::mem::replace(&mut self.value, JavaValue::Unread) {
            JavaValue::Bytes(b) => Ok(b),
            _ => Ok(Vec::new()),
        }
    }
}

fn type_name(code: u8) -> &'static str {
    match code {
        b'B' => "Int8",
        b'F' => "Float32",
        b'I' => "Int32",
        b'J' => "Int64",
        b'Z' => "Bool",
        b'[' => "Array",
        b'L' => "Object",
        _ => "Unknown",
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassDesc {
    pub name: String,
    pub fields: Vec<JavaField>,
}

impl ClassDesc {
    pub fn field_mut(&mut self, name: &str) -> Option<&mut JavaField> {
        self.fields.iter_mut().find(|f| f.is(name))
    }
}

fn read_name(r: &mut impl Read) -> Result<String, NbtError> {
    let len = r.read_u16::<BigEndian>()? as usize;
    if len > MAX_NAME_LEN {
        return Err(NbtError::StringTooLong {
            len,
            limit: MAX_NAME_LEN,
        });
    }
    let mut raw = [0u8; MAX_NAME_LEN];
    r.read_exact(&mut raw[..len])?;
    Ok(cp437::decode(&raw[..len]))
}

fn skip(r: &mut impl Read, n: u64) -> Result<(), NbtError> {
    let copied = io::copy(&mut r.by_ref().take(n), &mut io::sink())?;
    if copied < n {
        return Err(NbtError::UnexpectedEof);
    }
    Ok(())
}

fn read_field_desc(r: &mut impl Read) -> Result<JavaField, NbtError> {
    let type_code = r.read_u8()?;
    let name = read_name(r)?;

    if type_code == b'[' || type_code == b'L' {
        match r.read_u8()? {
            tc::STRING => {
                read_name(r)?;
            }
            tc::REFERENCE => {
                r.read_i32::<BigEndian>()?;
            }
            code => {
                return Err(NbtError::UnsupportedTypeCode {
                    code,
                    context: "field class name",
                })
            }
        }
    }
    Ok(JavaField {
        type_code,
        name,
        value: JavaValue::Unread,
    })
}

/// Reads a class descriptor; `None` for `TC_NULL`.
pub fn read_class_desc(r: &mut impl Read) -> Result<Option<ClassDesc>, NbtError> {
    match r.read_u8()? {
        tc::NULL => return Ok(None),
        tc::CLASSDESC => {}
        code => {
            return Err(NbtError::UnsupportedTypeCode {
                code,
                context: "class descriptor header",
            })
        }
    }

    let name = read_name(r)?;
    r.read_u64::<BigEndian>()?; // serialVersionUID
    r.read_u8()?; // flags

    let count = r.read_u16::<BigEndian>()? as usize;
    if count > MAX_FIELDS {
        return Err(NbtError::TooManyFields(count));
    }
    let mut fields = Vec::with_capacity(count);
    for _ in 0..count {
        fields.push(read_field_desc(r)?);
    }

    let code = r.read_u8()?;
    if code != tc::END_BLOCK_DATA {
        return Err(NbtError::UnsupportedTypeCode {
            code,
            context: "class descriptor footer",
        });
    }
    read_class_desc(r)?;
    Ok(Some(ClassDesc { name, fields }))
}

fn read_field_value(r: &mut impl Read, field: &mut JavaField) -> Result<(), NbtError> {
    field.value = match field.type_code {
        b'B' => JavaValue::Int8(r.read_i8()?),
        b'F' => JavaValue::Float32(r.read_f32::<BigEndian>()?),
        b'I' => JavaValue::Int32(r.read_i32::<BigEndian>()?),
        b'J' => JavaValue::Int64(r.read_i64::<BigEndian>()?),
        b'Z' => JavaValue::Bool(r.read_u8()? != 0),
        b'L' => {
            if field.is("blockMap") {
                skip_block_map(r)?;
            }
            JavaValue::Unread
        }
        b'[' => read_array(r)?,
        other => return Err(NbtError::UnsupportedFieldType(other as char)),
    };
    Ok(())
}

/// Skips the serialized block map of original server saves using fixed
/// offsets; maps from other servers store it as null.
fn skip_block_map(r: &mut impl Read) -> Result<(), NbtError> {
    match r.read_u8()? {
        tc::OBJECT => {
            skip(r, 315)?;
            let count = r.read_u32::<BigEndian>()? as u64;
            skip(r, 17 * count)?;
            skip(r, 152)
        }
        tc::NULL => Ok(()),
        code => Err(NbtError::UnsupportedTypeCode {
            code,
            context: "object field",
        }),
    }
}

fn read_array(r: &mut impl Read) -> Result<JavaValue, NbtError> {
    match r.read_u8()? {
        tc::NULL => return Ok(JavaValue::Unread),
        tc::ARRAY => {}
        code => {
            return Err(NbtError::UnsupportedTypeCode {
                code,
                context: "array field",
            })
        }
    }
    let desc = read_class_desc(r)?.ok_or(NbtError::OnlyByteArrays)?;
    if desc.name.as_bytes().get(1) != Some(&b'B') {
        return Err(NbtError::OnlyByteArrays);
    }
    let size = r.read_u32::<BigEndian>()? as usize;
    let mut data = vec![0u8; size];
    r.read_exact(&mut data)?;
    Ok(JavaValue::Bytes(data))
}

/// Reads the stream header and the single root object.
pub fn read_root_object(r: &mut impl Read) -> Result<ClassDesc, NbtError> {
    if r.read_u16::<BigEndian>()? != STREAM_MAGIC || r.read_u16::<BigEndian>()? != STREAM_VERSION {
        return Err(NbtError::BadMagic("java serialization header"));
    }
    let code = r.read_u8()?;
    if code != tc::OBJECT {
        return Err(NbtError::UnsupportedTypeCode {
            code,
            context: "root object",
        });
    }
    let mut desc = read_class_desc(r)?.unwrap_or_default();
    for field in &mut desc.fields {
        read_field_value(r, field)?;
    }
    Ok(desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::{Cursor, Write};

    fn put_name(out: &mut Vec<u8>, name: &str) {
        out.write_u16::<BigEndian>(name.len() as u16).unwrap();
        out.write_all(name.as_bytes()).unwrap();
    }

    /// Class descriptor with the given `(type, name)` fields and no superclass.
    fn put_class(out: &mut Vec<u8>, name: &str, fields: &[(u8, &str)]) {
        out.push(tc::CLASSDESC);
        put_name(out, name);
        out.write_u64::<BigEndian>(0x1234).unwrap();
        out.push(0x02);
        out.write_u16::<BigEndian>(fields.len() as u16).unwrap();
        for (ty, fname) in fields {
            out.push(*ty);
            put_name(out, fname);
            if *ty == b'[' || *ty == b'L' {
                out.push(tc::STRING);
                put_name(out, if *ty == b'[' { "[B" } else { "Ljava/util/Map;" });
            }
        }
        out.push(tc::END_BLOCK_DATA);
        out.push(tc::NULL);
    }

    fn stream_with(fields: &[(u8, &str)], values: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u16::<BigEndian>(STREAM_MAGIC).unwrap();
        out.write_u16::<BigEndian>(STREAM_VERSION).unwrap();
        out.push(tc::OBJECT);
        put_class(&mut out, "com.mojang.minecraft.level.Level", fields);
        out.extend_from_slice(values);
        out
    }

    #[test]
    fn reads_primitive_fields() {
        let mut values = Vec::new();
        values.write_i32::<BigEndian>(256).unwrap();
        values.write_i8(-3).unwrap();
        values.write_f32::<BigEndian>(1.5).unwrap();
        values.write_i64::<BigEndian>(99).unwrap();
        values.push(1);
        let data = stream_with(
            &[(b'I', "width"), (b'B', "b"), (b'F', "f"), (b'J', "j"), (b'Z', "z")],
            &values,
        );
        let mut desc = read_root_object(&mut Cursor::new(data)).unwrap();
        assert_eq!(desc.name, "com.mojang.minecraft.level.Level");
        assert_eq!(desc.field_mut("WIDTH").unwrap().int32().unwrap(), 256);
        assert_eq!(desc.fields[1].value, JavaValue::Int8(-3));
        assert_eq!(desc.fields[2].value, JavaValue::Float32(1.5));
        assert_eq!(desc.fields[3].value, JavaValue::Int64(99));
        assert_eq!(desc.fields[4].value, JavaValue::Bool(true));
    }

    #[test]
    fn reads_byte_array_and_skips_block_map() {
        let mut values = Vec::new();
        values.push(tc::OBJECT);
        values.extend(std::iter::repeat(0).take(315));
        values.write_u32::<BigEndian>(2).unwrap();
        values.extend(std::iter::repeat(0).take(34 + 152));
        values.push(tc::ARRAY);
        put_class(&mut values, "[B", &[]);
        values.write_u32::<BigEndian>(3).unwrap();
        values.extend_from_slice(&[1, 2, 3]);
        let data = stream_with(&[(b'L', "blockMap"), (b'[', "blocks")], &values);
        let mut desc = read_root_object(&mut Cursor::new(data)).unwrap();
        let blocks = desc.field_mut("blocks").unwrap().take_bytes().unwrap();
        assert_eq!(blocks, vec![1, 2, 3]);
    }

    #[test]
    fn other_objects_are_not_read() {
        let data = stream_with(&[(b'I', "width"), (b'L', "player")], &[0, 0, 0, 5]);
        let desc = read_root_object(&mut Cursor::new(data)).unwrap();
        assert_eq!(desc.fields[1].value, JavaValue::Unread);
    }

    #[test]
    fn non_byte_array_rejected() {
        let mut values = vec![tc::ARRAY];
        put_class(&mut values, "[I", &[]);
        let data = stream_with(&[(b'[', "blocks")], &values);
        assert!(matches!(
            read_root_object(&mut Cursor::new(data)),
            Err(NbtError::OnlyByteArrays)
        ));
    }

    #[test]
    fn too_many_fields() {
        let fields: Vec<(u8, String)> = (0..23).map(|i| (b'I', format!("f{i}"))).collect();
        let refs: Vec<(u8, &str)> = fields.iter().map(|(t, n)| (*t, n.as_str())).collect();
        let data = stream_with(&refs, &[]);
        assert!(matches!(
            read_root_object(&mut Cursor::new(data)),
            Err(NbtError::TooManyFields(23))
        ));
    }

    #[test]
    fn short_field_type_rejected() {
        let data = stream_with(&[(b'S', "s")], &[0, 1]);
        assert!(matches!(
            read_root_object(&mut Cursor::new(data)),
            Err(NbtError::UnsupportedFieldType('S'))
        ));
    }

    #[test]
    fn bad_stream_magic() {
        let data = vec![0xAC, 0xED, 0x00, 0x04];
        assert!(matches!(
            read_root_object(&mut Cursor::new(data)),
            Err(NbtError::BadMagic(_))
        ));
    }
}
