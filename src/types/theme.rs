//! Theme word lists

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

const COUNTRIES: [&str; 35] = [
    "Brasil", "Portugal", "Espanha", "França", "Itália", "Alemanha",
    "Inglaterra", "Japão", "China", "Índia", "México", "Argentina",
    "Canadá", "Austrália", "Rússia", "Egito", "Marrocos", "Grécia",
    "Turquia", "Tailândia", "Vietnã", "Coreia", "Chile", "Peru",
    "Colômbia", "Suécia", "Noruega", "Dinamarca", "Finlândia", "Islândia",
    "Irlanda", "Holanda", "Bélgica", "Suíça", "Áustria",
];

const FRUITS: [&str; 35] = [
    "Maçã", "Banana", "Laranja", "Morango", "Uva", "Melancia",
    "Abacaxi", "Manga", "Mamão", "Pêra", "Kiwi", "Cereja",
    "Ameixa", "Pêssego", "Limão", "Melão", "Framboesa", "Amora",
    "Coco", "Goiaba", "Maracujá", "Acerola", "Jabuticaba", "Caqui",
    "Romã", "Figo", "Lichia", "Carambola", "Pitaya", "Graviola",
    "Açaí", "Cupuaçu", "Tâmara", "Nectarina", "Tangerina",
];

const ANIMALS: [&str; 35] = [
    "Leão", "Tigre", "Elefante", "Girafa", "Zebra", "Macaco",
    "Cachorro", "Gato", "Cavalo", "Vaca", "Porco", "Ovelha",
    "Coelho", "Lobo", "Urso", "Panda", "Canguru", "Koala",
    "Pinguim", "Golfinho", "Baleia", "Tubarão", "Polvo", "Tartaruga",
    "Cobra", "Crocodilo", "Águia", "Coruja", "Papagaio", "Pato",
    "Borboleta", "Abelha", "Formiga", "Aranha", "Escorpião",
];

/// Word category the player picks a word from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Countries,
    Fruits,
    Animals,
}

impl Theme {
    /// Full word list for this theme
    pub fn words(&self) -> &'static [&'static str] {
        match self {
            Theme::Countries => &COUNTRIES,
            Theme::Fruits => &FRUITS,
            Theme::Animals => &ANIMALS,
        }
    }

    /// Draw up to `count` distinct words, in draw order
    pub fn sample_words<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
        self.words()
            .choose_multiple(rng, count)
            .map(|w| w.to_string())
            .collect()
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Theme::Countries => "countries",
            Theme::Fruits => "fruits",
            Theme::Animals => "animals",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_sample_is_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let words = Theme::Animals.sample_words(16, &mut rng);
        assert_eq!(words.len(), 16);
        let unique: HashSet<_> = words.iter().collect();
        assert_eq!(unique.len(), 16);
        assert!(words.iter().all(|w| Theme::Animals.words().contains(&w.as_str())));
    }

    #[test]
    fn test_sample_caps_at_list_length() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Theme::Fruits.sample_words(100, &mut rng).len(), 35);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let a = Theme::Countries.sample_words(16, &mut StdRng::seed_from_u64(42));
        let b = Theme::Countries.sample_words(16, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
