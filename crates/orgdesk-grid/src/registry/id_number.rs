/// Israeli ID number checksum
///
/// Up to nine digits, left-padded with zeros. Digits are weighted 1,2,1,2...
/// and products above 9 contribute the sum of their digits. Valid numbers
/// sum to a multiple of ten.
pub fn is_valid_id_number(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.len() > 9 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let padded = format!("{:0>9}", trimmed);
    let sum: u32 = padded
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            let product = digit * if i % 2 == 0 { 1 } else { 2 };
            if product > 9 { product - 9 } else { product }
        })
        .sum();

    sum % 10 == 0
}
