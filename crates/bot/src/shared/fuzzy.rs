//! Нечёткое сравнение строк
//!
//! Оценка одного окна берётся из `strsim` (нормализованное расстояние
//! Дамерау-Левенштейна), здесь только перебор окон: короткая строка
//! прикладывается ко всем фрагментам длинной той же длины, включая
//! фрагменты, свисающие с краёв.

/// Сходство двух строк целиком, 0..=100
fn ratio(a: &str, b: &str) -> f64 {
    100.0 * strsim::normalized_damerau_levenshtein(a, b)
}

/// Сходство короткой строки с лучшим фрагментом длинной, 0..=100
///
/// Симметрична: порядок аргументов не важен.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let best = best_alignment(short, long);
    if short.chars().count() == long.chars().count() && best < 100.0 {
        return best.max(best_alignment(long, short));
    }
    best
}

/// Байтовые границы символов строки, включая её конец
fn char_bounds(s: &str) -> Vec<usize> {
    s.char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(s.len()))
        .collect()
}

fn best_alignment(short: &str, long: &str) -> f64 {
    let m = short.chars().count();
    let bounds = char_bounds(long);
    let n = bounds.len() - 1;
    // Фрагмент long из символов [from, to)
    let window = |from: usize, to: usize| &long[bounds[from]..bounds[to]];
    let mut best = 0.0f64;

    // Окна, свисающие с левого края
    for end in 1..m.min(n + 1) {
        best = best.max(ratio(short, window(0, end)));
        if best >= 100.0 {
            return best;
        }
    }

    // Полные окна длины m
    for start in 0..=n.saturating_sub(m) {
        best = best.max(ratio(short, window(start, (start + m).min(n))));
        if best >= 100.0 {
            return best;
        }
    }

    // Окна, свисающие с правого края
    for start in (n + 1).saturating_sub(m).max(1)..n {
        best = best.max(ratio(short, window(start, n)));
        if best >= 100.0 {
            return best;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", "abc"), 100.0);
        assert_eq!(ratio("abc", ""), 0.0);
        assert_eq!(ratio("abcd", "abce"), 75.0);
    }

    #[test]
    fn test_partial_ratio_substring_is_full_score() {
        assert_eq!(partial_ratio("alpha", "ord-alpha-1"), 100.0);
        assert_eq!(partial_ratio("ord-alpha-1", "alpha"), 100.0);
        assert_eq!(partial_ratio("смирнов", "заказ смирнов 15"), 100.0);
    }

    #[test]
    fn test_partial_ratio_typo_on_threshold() {
        // одна ошибка на 5 символов: 1 - 1/5
        assert_eq!(partial_ratio("alpxa", "ord-alpha-1"), 80.0);
        assert_eq!(partial_ratio("alpah", "ord-alpha-1"), 80.0);
        assert!(partial_ratio("alxxa", "ord-alpha-1") < 80.0);
        assert!(partial_ratio("alpha", "ord-beta-2") < 80.0);
    }

    #[test]
    fn test_partial_ratio_edge_overhang() {
        // лучшее окно "alpha" короче запроса и прижато к краю строки
        assert!(partial_ratio("xalpha", "alpha-order") > 83.0);
        assert!(partial_ratio("alphax", "order-alpha") > 83.0);
        assert!(ratio("xalpha", "alpha-") < 80.0);
    }

    #[test]
    fn test_partial_ratio_cyrillic_windows() {
        assert_eq!(partial_ratio("шкаф", "Смирнов шкаф".to_lowercase().as_str()), 100.0);
        assert!(partial_ratio("кухня", "иванов шкаф") < 80.0);
    }

    #[test]
    fn test_partial_ratio_empty() {
        assert_eq!(partial_ratio("", ""), 100.0);
        assert_eq!(partial_ratio("", "abc"), 0.0);
    }
}
