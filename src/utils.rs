use rand::Rng;

/// Generate a record identifier: hex microsecond timestamp plus a
/// random suffix. Collisions are left to the primary-key constraint.
pub fn generate_id() -> String {
    let micros = chrono::Utc::now().timestamp_micros();
    let suffix: u32 = rand::thread_rng().gen();
    format!("{:x}_{:08x}", micros, suffix)
}

/// Timestamp format shared by every `created_at`/`updated_at` column.
pub fn now_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_enough() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_id()));
        }
    }

    #[test]
    fn stamp_has_expected_shape() {
        let stamp = now_stamp();
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
    }
}
