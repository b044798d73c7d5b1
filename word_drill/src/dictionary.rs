//! Russian -> English word table

use crate::error::{DrillError, Result};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::fmt;

/// A prompt word and the translation the learner should say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordPair {
    pub russian: &'static str,
    pub english: &'static str,
}

impl WordPair {
    pub const fn new(russian: &'static str, english: &'static str) -> Self {
        Self { russian, english }
    }
}

impl fmt::Display for WordPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.russian, self.english)
    }
}

pub static DICTIONARY: &[WordPair] = &[
    WordPair::new("привет", "hello"),
    WordPair::new("мир", "world"),
    WordPair::new("солнце", "sun"),
    WordPair::new("книга", "book"),
    WordPair::new("компьютер", "computer"),
    WordPair::new("программа", "program"),
    WordPair::new("язык", "language"),
    WordPair::new("друг", "friend"),
    WordPair::new("кошка", "cat"),
    WordPair::new("собака", "dog"),
    WordPair::new("дом", "house"),
    WordPair::new("машина", "car"),
    WordPair::new("дорога", "road"),
    WordPair::new("небо", "sky"),
    WordPair::new("облако", "cloud"),
    WordPair::new("река", "river"),
    WordPair::new("лес", "forest"),
    WordPair::new("гора", "mountain"),
    WordPair::new("поле", "field"),
    WordPair::new("город", "city"),
    WordPair::new("ветер", "wind"),
    WordPair::new("дождь", "rain"),
    WordPair::new("снег", "snow"),
    WordPair::new("тепло", "warm"),
    WordPair::new("холод", "cold"),
    WordPair::new("счастье", "happiness"),
    WordPair::new("радость", "joy"),
    // same word both sides; pronunciation check only
    WordPair::new("yacht", "yacht"),
    WordPair::new("любовь", "love"),
    WordPair::new("работа", "work"),
    WordPair::new("время", "time"),
    WordPair::new("день", "day"),
    WordPair::new("ночь", "night"),
    WordPair::new("утро", "morning"),
    WordPair::new("вечер", "evening"),
    WordPair::new("завтрак", "breakfast"),
    WordPair::new("обед", "lunch"),
    WordPair::new("ужин", "dinner"),
    WordPair::new("вода", "water"),
    WordPair::new("огонь", "fire"),
    WordPair::new("земля", "earth"),
    WordPair::new("воздух", "air"),
    WordPair::new("человек", "person"),
    WordPair::new("жизнь", "life"),
    WordPair::new("смерть", "death"),
    WordPair::new("начало", "start"),
    WordPair::new("конец", "end"),
    WordPair::new("вопрос", "question"),
    WordPair::new("ответ", "answer"),
    WordPair::new("тишина", "silence"),
    WordPair::new("звук", "sound"),
    WordPair::new("музыка", "music"),
    WordPair::new("песня", "song"),
    WordPair::new("танец", "dance"),
    WordPair::new("бежать", "run"),
    WordPair::new("идти", "walk"),
    WordPair::new("спать", "sleep"),
    WordPair::new("есть", "eat"),
    WordPair::new("пить", "drink"),
    WordPair::new("говорить", "speak"),
    WordPair::new("читать", "read"),
    WordPair::new("писать", "write"),
    WordPair::new("думать", "think"),
    WordPair::new("знать", "know"),
    WordPair::new("хотеть", "want"),
    WordPair::new("мочь", "can"),
    WordPair::new("делать", "do"),
    WordPair::new("видеть", "see"),
    WordPair::new("слышать", "hear"),
    WordPair::new("чувствовать", "feel"),
    WordPair::new("большой", "big"),
    WordPair::new("маленький", "small"),
    WordPair::new("красивый", "beautiful"),
    WordPair::new("новый", "new"),
    WordPair::new("старый", "old"),
    WordPair::new("хороший", "good"),
    WordPair::new("плохой", "bad"),
    WordPair::new("быстрый", "fast"),
    WordPair::new("медленный", "slow"),
    WordPair::new("легкий", "easy"),
    WordPair::new("тяжелый", "hard"),
    WordPair::new("свет", "light"),
    WordPair::new("тень", "shadow"),
    WordPair::new("красный", "red"),
    WordPair::new("синий", "blue"),
    WordPair::new("зеленый", "green"),
    WordPair::new("желтый", "yellow"),
    WordPair::new("белый", "white"),
    WordPair::new("черный", "black"),
    WordPair::new("здоровье", "health"),
    WordPair::new("успех", "success"),
    WordPair::new("зима", "winter"),
    WordPair::new("лето", "summer"),
    WordPair::new("осень", "autumn"),
    WordPair::new("весна", "spring"),
    WordPair::new("семья", "family"),
    WordPair::new("школа", "school"),
    WordPair::new("учитель", "teacher"),
    WordPair::new("ученик", "student"),
    WordPair::new("доктор", "doctor"),
    WordPair::new("инженер", "engineer"),
    WordPair::new("политик", "politician"),
    WordPair::new("музыкант", "musician"),
    WordPair::new("художник", "artist"),
    WordPair::new("писатель", "writer"),
    WordPair::new("актер", "actor"),
    WordPair::new("спортсмен", "athlete"),
    WordPair::new("король", "king"),
    WordPair::new("королева", "queen"),
    WordPair::new("принц", "prince"),
    WordPair::new("принцесса", "princess"),
];

/// Uniform pick from `dictionary`.
pub fn random_pair<R: Rng + ?Sized>(dictionary: &[WordPair], rng: &mut R) -> Result<WordPair> {
    dictionary
        .choose(rng)
        .copied()
        .ok_or(DrillError::EmptyDictionary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_dictionary_has_no_duplicate_prompts() {
        let unique: HashSet<_> = DICTIONARY.iter().map(|p| p.russian).collect();
        assert_eq!(unique.len(), DICTIONARY.len());
    }

    #[test]
    fn test_translations_are_lowercase_single_words() {
        for pair in DICTIONARY {
            assert_eq!(pair.english, pair.english.to_lowercase(), "{}", pair);
            assert!(!pair.english.contains(char::is_whitespace), "{}", pair);
        }
    }

    #[test]
    fn test_random_pair_empty_dictionary() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            random_pair(&[], &mut rng),
            Err(DrillError::EmptyDictionary)
        ));
    }

    #[test]
    fn test_random_pair_is_deterministic_for_seed() {
        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| random_pair(DICTIONARY, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(7), picks(7));
        assert!(picks(7).iter().all(|p| DICTIONARY.contains(p)));
    }

    #[test]
    fn test_random_pair_covers_small_table() {
        let table = [WordPair::new("да", "yes"), WordPair::new("нет", "no")];
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<_> = (0..200)
            .map(|_| random_pair(&table, &mut rng).unwrap().english)
            .collect();
        assert_eq!(seen.len(), 2);
    }
}
