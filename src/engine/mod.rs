//! Декодер дампа: примитивы формата, читатели значений, мапперы и
//! потоковый конечный автомат.
//!
//! - `source`: буферизованный источник со смещением и CRC-64.
//! - `length`, `string`, `float`, `compression`: примитивы формата.
//! - `readers`, `mappers`: элемент plain-коллекции и его событие.
//! - `dispatch`, `tags`: закрытая таблица тегов.
//! - `streaming`: [`Decoder`].

pub mod compression;
pub mod dispatch;
pub mod events;
pub mod float;
pub mod length;
pub mod mappers;
pub mod readers;
pub mod source;
pub mod streaming;
pub mod string;
pub mod tags;

pub use events::*;
pub use readers::ScoreFormat;
pub use streaming::*;
