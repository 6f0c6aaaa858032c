use nucleon_primitives::encoding::{decode, DecodeError, Decoder, Encoder};
use nucleon_primitives::outpoint::OutPoint;
use nucleon_primitives::transaction::{Transaction, TxIn, TxOut};

#[test]
fn compact_size_boundaries() {
    for value in [0u64, 1, 0xfc, 0xfd, 0xffff, 0x1_0000, 0x0200_0000] {
        let mut encoder = Encoder::new();
        encoder.write_compact_size(value);
        let bytes = encoder.into_inner();
        let mut decoder = Decoder::new(&bytes);
        assert_eq!(decoder.read_compact_size(), Ok(value));
        assert!(decoder.is_empty());
    }
}

#[test]
fn compact_size_rejects_non_canonical() {
    // 0xfd prefix carrying a value that fits in one byte.
    let mut decoder = Decoder::new(&[0xfd, 0x10, 0x00]);
    assert_eq!(
        decoder.read_compact_size(),
        Err(DecodeError::NonCanonicalCompactSize)
    );

    // 0xfe prefix carrying a value that fits in two bytes.
    let mut decoder = Decoder::new(&[0xfe, 0xff, 0xff, 0x00, 0x00]);
    assert_eq!(
        decoder.read_compact_size(),
        Err(DecodeError::NonCanonicalCompactSize)
    );
}

#[test]
fn compact_size_rejects_oversize() {
    let mut encoder = Encoder::new();
    encoder.write_compact_size(0x0200_0001);
    let bytes = encoder.into_inner();
    let mut decoder = Decoder::new(&bytes);
    assert_eq!(decoder.read_compact_size(), Err(DecodeError::SizeTooLarge));
}

#[test]
fn short_input_is_an_error() {
    let outpoint = OutPoint::new([0x11; 32], 7);
    let bytes = nucleon_primitives::encoding::encode(&outpoint);
    let err = decode::<OutPoint>(&bytes[..bytes.len() - 1]).unwrap_err();
    assert_eq!(err, DecodeError::UnexpectedEof);
}

#[test]
fn surplus_input_is_an_error() {
    let outpoint = OutPoint::new([0x22; 32], 9);
    let mut bytes = nucleon_primitives::encoding::encode(&outpoint);
    bytes.push(0x00);
    let err = decode::<OutPoint>(&bytes).unwrap_err();
    assert_eq!(err, DecodeError::TrailingBytes);
}

#[test]
fn var_str_roundtrip() {
    let mut encoder = Encoder::new();
    encoder.write_var_str("04a1b2c3");
    let bytes = encoder.into_inner();
    let mut decoder = Decoder::new(&bytes);
    assert_eq!(decoder.read_var_str().as_deref(), Ok("04a1b2c3"));
}

#[test]
fn coinbase_and_coinstake_classification() {
    let coinbase = Transaction {
        version: 1,
        time: 0,
        vin: vec![TxIn {
            prevout: OutPoint::null(),
            script_sig: vec![0x04],
            sequence: u32::MAX,
        }],
        vout: vec![TxOut {
            value: 100,
            script_pubkey: vec![0x51],
        }],
        lock_time: 0,
    };
    assert!(coinbase.is_coinbase());
    assert!(!coinbase.is_coinstake());

    let coinstake = Transaction {
        version: 1,
        time: 0,
        vin: vec![TxIn {
            prevout: OutPoint::new([0x33; 32], 0),
            script_sig: Vec::new(),
            sequence: u32::MAX,
        }],
        vout: vec![
            TxOut {
                value: 0,
                script_pubkey: Vec::new(),
            },
            TxOut {
                value: 200,
                script_pubkey: vec![0x51],
            },
        ],
        lock_time: 0,
    };
    assert!(!coinstake.is_coinbase());
    assert!(coinstake.is_coinstake());
}
