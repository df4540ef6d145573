use std::collections::HashMap;

use hearth_infer::TextCodec;
use tokenizers::models::wordlevel::WordLevel;
use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::Tokenizer;

const UNK: u32 = 0;
const BOS: u32 = 1;
const EOS: u32 = 2;

fn word_tokenizer(words: &[&str]) -> Tokenizer {
    let mut vocab: HashMap<String, u32> = HashMap::new();
    vocab.insert("<unk>".to_string(), UNK);
    vocab.insert("<s>".to_string(), BOS);
    vocab.insert("</s>".to_string(), EOS);
    for (i, w) in words.iter().enumerate() {
        vocab.insert((*w).to_string(), 3 + i as u32);
    }
    let model = WordLevel::builder()
        .vocab(vocab)
        .unk_token("<unk>".to_string())
        .build()
        .expect("word-level model");
    let mut tokenizer = Tokenizer::new(model);
    tokenizer.with_pre_tokenizer(Whitespace {});
    tokenizer
}

fn codec(words: &[&str], context_length: usize) -> TextCodec {
    TextCodec::new(word_tokenizer(words), BOS, EOS, EOS, context_length)
}

#[test]
fn encode_prepends_bos_and_appends_nothing() {
    let codec = codec(&["hello", "world"], 64);
    let ids = codec.encode("hello world").expect("encode");
    assert_eq!(ids, vec![BOS, 3, 4]);
}

#[test]
fn round_trip_preserves_word_tokens() {
    let words = ["the", "stove", "needs", "dry", "firewood"];
    let codec = codec(&words, 64);
    let text = "the stove needs dry firewood";
    let decoded = codec.decode(&codec.encode(text).expect("encode")).expect("decode");
    assert_eq!(decoded, text);
}

#[test]
fn decode_skips_control_tokens_and_stops_at_eos() {
    let codec = codec(&["hello", "world"], 64);
    // BOS is filtered, EOS terminates before "world" is reached.
    let decoded = codec.decode(&[BOS, 3, EOS, 4]).expect("decode");
    assert_eq!(decoded, "hello");
}

#[test]
fn decode_token_renders_control_ids_as_empty() {
    let codec = codec(&["hello"], 64);
    assert_eq!(codec.decode_token(BOS).expect("decode"), "");
    assert_eq!(codec.decode_token(EOS).expect("decode"), "");
    assert_eq!(codec.decode_token(3).expect("decode"), "hello");
}

#[test]
fn long_input_is_truncated_oldest_first() {
    let words = ["w1", "w2", "w3", "w4", "w5", "w6", "w7", "w8"];
    let codec = codec(&words, 5);
    let ids = codec.encode("w1 w2 w3 w4 w5 w6 w7 w8").expect("encode");

    assert_eq!(ids.len(), 5, "clamped to the context window");
    assert_eq!(ids[0], BOS, "the sequence marker survives truncation");
    // The most recent words are preserved; the oldest are discarded.
    let decoded = codec.decode(&ids).expect("decode");
    assert_eq!(decoded, "w5 w6 w7 w8");
}

#[test]
fn clamp_window_is_a_noop_for_short_histories() {
    let codec = codec(&["a", "b"], 16);
    let ids = vec![BOS, 3, 4];
    assert_eq!(codec.clamp_window(ids.clone()), ids);
}
