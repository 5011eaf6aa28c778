use {
    super::{
        ParameterValues,
        coerce::{self, Value},
    },
    alloy::{
        dyn_abi::{DynSolType, DynSolValue},
        primitives::{Address, B256, Bytes, I256, U256},
    },
    model::TemplateField,
    num::{BigInt, Signed, bigint::Sign},
};

/// ABI encodes the constructor arguments for `fields` from raw operator
/// input.
///
/// Values are coerced in schema order and tuple encoded, so the order of
/// `fields` must match the on-chain constructor. An empty schema always
/// encodes to empty bytes. A fixed-size array left empty encodes as zero
/// values; otherwise it must have exactly its declared length.
pub fn encode(fields: &[TemplateField], values: &ParameterValues) -> Result<Bytes, EncodeError> {
    if fields.is_empty() {
        return Ok(Bytes::new());
    }

    let mut encoded = Vec::with_capacity(fields.len());
    for field in fields {
        let ty = DynSolType::parse(&field.ty).map_err(|source| EncodeError::Type {
            field: field.name.clone(),
            ty: field.ty.clone(),
            source,
        })?;
        let value = coerce::coerce(&field.ty, values.get(&field.name).map(String::as_str));
        let value = sol_value(&ty, &value).map_err(|reason| EncodeError::Value {
            field: field.name.clone(),
            ty: field.ty.clone(),
            reason,
        })?;
        encoded.push(value);
    }
    Ok(DynSolValue::Tuple(encoded).abi_encode_params().into())
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("field {field:?} has an invalid ABI type {ty:?}: {source}")]
    Type {
        field: String,
        ty: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },
    #[error("field {field:?} cannot be encoded as {ty}: {reason}")]
    Value {
        field: String,
        ty: String,
        reason: String,
    },
}

fn sol_value(ty: &DynSolType, value: &Value) -> Result<DynSolValue, String> {
    match (ty, value) {
        (DynSolType::Array(element), Value::Array(items)) => items
            .iter()
            .map(|item| sol_value(element, item))
            .collect::<Result<_, _>>()
            .map(DynSolValue::Array),
        (DynSolType::FixedArray(element, len), Value::Array(items)) => {
            if items.is_empty() {
                return (0..*len)
                    .map(|_| zero_value(element))
                    .collect::<Result<_, _>>()
                    .map(DynSolValue::FixedArray);
            }
            if items.len() != *len {
                return Err(format!(
                    "expected {len} elements but got {got}",
                    got = items.len()
                ));
            }
            items
                .iter()
                .map(|item| sol_value(element, item))
                .collect::<Result<_, _>>()
                .map(DynSolValue::FixedArray)
        }
        (DynSolType::Uint(bits), Value::Int(int)) => {
            uint(int, *bits).map(|n| DynSolValue::Uint(n, *bits))
        }
        (DynSolType::Int(bits), Value::Int(int)) => {
            signed(int, *bits).map(|n| DynSolValue::Int(n, *bits))
        }
        (DynSolType::Bool, Value::Bool(flag)) => Ok(DynSolValue::Bool(*flag)),
        (DynSolType::Bytes, Value::Bytes(hex)) => decode_hex(hex).map(DynSolValue::Bytes),
        (DynSolType::FixedBytes(size), Value::Bytes(hex)) => {
            let bytes = decode_hex(hex)?;
            if bytes.is_empty() {
                return Ok(DynSolValue::FixedBytes(B256::ZERO, *size));
            }
            if bytes.len() != *size {
                return Err(format!(
                    "expected {size} bytes but got {len}",
                    len = bytes.len()
                ));
            }
            Ok(DynSolValue::FixedBytes(B256::right_padding_from(&bytes), *size))
        }
        (DynSolType::String, Value::Text(text)) => Ok(DynSolValue::String(text.clone())),
        (ty, Value::Text(text)) => ty.coerce_str(text).map_err(|err| err.to_string()),
        (ty, value) => Err(format!(
            "unexpected value {value:?} for {}",
            ty.sol_type_name()
        )),
    }
}

fn zero_value(ty: &DynSolType) -> Result<DynSolValue, String> {
    Ok(match ty {
        DynSolType::Address => DynSolValue::Address(Address::ZERO),
        DynSolType::Bool => DynSolValue::Bool(false),
        DynSolType::Uint(bits) => DynSolValue::Uint(U256::ZERO, *bits),
        DynSolType::Int(bits) => DynSolValue::Int(I256::ZERO, *bits),
        DynSolType::FixedBytes(size) => DynSolValue::FixedBytes(B256::ZERO, *size),
        DynSolType::Bytes => DynSolValue::Bytes(Vec::new()),
        DynSolType::String => DynSolValue::String(String::new()),
        DynSolType::Array(_) => DynSolValue::Array(Vec::new()),
        DynSolType::FixedArray(element, len) => DynSolValue::FixedArray(
            (0..*len)
                .map(|_| zero_value(element))
                .collect::<Result<_, _>>()?,
        ),
        ty => return Err(format!("no zero value for {}", ty.sol_type_name())),
    })
}

fn uint(value: &BigInt, bits: usize) -> Result<U256, String> {
    if value.is_negative() {
        return Err(format!("{value} is negative"));
    }
    if value.bits() > bits as u64 {
        return Err(format!("{value} does not fit into {bits} bits"));
    }
    let (_, bytes) = value.to_bytes_be();
    U256::try_from_be_slice(&bytes).ok_or_else(|| format!("{value} does not fit into 256 bits"))
}

fn signed(value: &BigInt, bits: usize) -> Result<I256, String> {
    let bound = BigInt::from(1) << (bits - 1);
    if *value >= bound || *value < -bound {
        return Err(format!("{value} does not fit into {bits} signed bits"));
    }
    // Two's complement over 256 bits.
    let raw = match value.sign() {
        Sign::Minus => (BigInt::from(1) << 256usize) + value,
        _ => value.clone(),
    };
    let (_, bytes) = raw.to_bytes_be();
    U256::try_from_be_slice(&bytes)
        .map(I256::from_raw)
        .ok_or_else(|| format!("{value} does not fit into 256 bits"))
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, String> {
    if hex.is_empty() {
        return Ok(Vec::new());
    }
    const_hex::decode(hex).map_err(|err| format!("invalid hex {hex:?}: {err}"))
}
