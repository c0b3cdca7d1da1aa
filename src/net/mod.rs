//! # 依赖 Petri 网（Place/Transition Net）
//!
//! 库所 `P` 表示系统组件，迁移 `T` 表示依赖规则（门）。每条输入弧
//! `p -> t` 表示 `p` 是 `t` 的前驱，每条输出弧 `t -> q` 表示 `t` 产生 `q`。
//!
//! * 根库所（ORPHAN）初始标识为 1，其余为 0；
//! * AND/SINGLE 门需要全部前驱，OR 门只需任意一个前驱；
//! * 被级联删除的库所留下墓碑，下标保持稳定，不会再被创建。
//!
//! ## 示例
//!
//! ```rust
//! use pear::net::*;
//!
//! let mut net = Net::empty();
//! let a = net.add_place(Place::root("A"));
//! let b = net.add_place(Place::new("B"));
//! let t = net.add_transition(Transition::new("T1", GateKind::Single));
//!
//! assert!(net.add_input_arc(a, t));
//! assert!(net.add_output_arc(b, t));
//! assert!(!net.add_output_arc(b, t));
//!
//! assert_eq!(net.marking().tokens(a), 1);
//! assert_eq!(net.postset(t).collect::<Vec<_>>(), vec![b]);
//! ```

pub mod core;
pub mod ids;
pub mod incidence;
pub mod index_vec;
pub mod io;
pub mod structure;

pub use core::{DiagnosticReport, Net};
pub use ids::{PlaceId, TransitionId};
pub use incidence::IncidenceBool;
pub use index_vec::{Idx, IndexVec};
pub use structure::{Arc, ArcDirection, GateKind, Marking, Place, Transition, Weight};
