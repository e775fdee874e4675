use rand::Rng;

/// Literal prefix every verification code carries.
pub const CODE_PREFIX: &str = "CMC-";
/// 32 symbols; omits I, O, 0 and 1.
pub const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_BODY_LEN: usize = 8;
/// Generation attempts before giving up on a unique code.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Produces candidate verification codes.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        let mut code = String::with_capacity(CODE_PREFIX.len() + CODE_BODY_LEN);
        code.push_str(CODE_PREFIX);
        for _ in 0..CODE_BODY_LEN {
            let index = rng.random_range(0..CODE_ALPHABET.len());
            code.push(CODE_ALPHABET[index] as char);
        }
        code
    }
}

/// Returns true when `code` has the prefix plus eight alphabet symbols.
pub fn is_well_formed(code: &str) -> bool {
    match code.strip_prefix(CODE_PREFIX) {
        Some(body) => {
            body.len() == CODE_BODY_LEN && body.bytes().all(|b| CODE_ALPHABET.contains(&b))
        }
        None => false,
    }
}

/// Case-insensitive search for the code inside post text.
pub fn text_contains_code(text: &str, code: &str) -> bool {
    text.to_lowercase().contains(&code.to_lowercase())
}
