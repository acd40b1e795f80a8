//! Lookup of compiled contract artifacts and ABI encoding against them

use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::{JsonAbi, Param},
    primitives::Bytes,
};
use deployments::ParamDef;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{constants::ARTIFACT_EXTENSION, errors::ScriptError};

/// The bytecode field of an artifact, either a hex string (Hardhat) or an
/// object wrapping one (Foundry)
#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    /// A bare hex string
    Hex(String),
    /// An object with the hex string under `object`
    Object {
        /// The hex-encoded bytecode
        object: String,
    },
}

/// The parts of an artifact file the scripts use
#[derive(Deserialize)]
struct ArtifactFile {
    /// The contract ABI
    abi: JsonAbi,
    /// The creation bytecode
    bytecode: BytecodeField,
}

/// A compiled contract
#[derive(Clone, Debug)]
pub struct Artifact {
    /// The contract name
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: Bytes,
}

/// Constructor calldata along with what the deployment record keeps of it
#[derive(Clone, Debug)]
pub struct EncodedConstructor {
    /// The creation bytecode followed by the encoded arguments
    pub deploy_code: Bytes,
    /// The arguments, in declaration order
    pub arguments: Vec<Value>,
    /// The name and type of each constructor parameter
    pub parameter_defs: Vec<ParamDef>,
}

impl Artifact {
    /// Parse an artifact from the JSON contents of its file
    pub fn from_json(name: &str, contents: &str) -> Result<Self, ScriptError> {
        let file: ArtifactFile = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{name}: {e}")))?;
        let hex = match file.bytecode {
            BytecodeField::Hex(hex) | BytecodeField::Object { object: hex } => hex,
        };
        if hex.contains("__") {
            return Err(ScriptError::ArtifactParsing(format!(
                "{name}: bytecode has unlinked libraries"
            )));
        }
        let bytecode = Bytes::from_str(&hex)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{name}: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            abi: file.abi,
            bytecode,
        })
    }

    /// Encode the creation code for the given constructor arguments
    pub fn encode_constructor(&self, args: &[String]) -> Result<EncodedConstructor, ScriptError> {
        let (encoded, parameter_defs) = match &self.abi.constructor {
            Some(constructor) => {
                let values = coerce_args(&constructor.inputs, args)?;
                let encoded = constructor
                    .abi_encode_input(&values)
                    .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
                (encoded, param_defs(&constructor.inputs))
            }
            None if args.is_empty() => (Vec::new(), Vec::new()),
            None => {
                return Err(ScriptError::CalldataConstruction(format!(
                    "{} has no constructor but {} arguments were given",
                    self.name,
                    args.len()
                )))
            }
        };

        let mut deploy_code = self.bytecode.to_vec();
        deploy_code.extend_from_slice(&encoded);

        Ok(EncodedConstructor {
            deploy_code: deploy_code.into(),
            arguments: args.iter().cloned().map(Value::String).collect(),
            parameter_defs,
        })
    }

    /// Encode a call to `function`, picking the overload that takes `args.len()` arguments
    pub fn encode_call(&self, function: &str, args: &[String]) -> Result<Bytes, ScriptError> {
        let overloads = self.abi.function(function).ok_or_else(|| {
            ScriptError::CalldataConstruction(format!("{} has no function `{function}`", self.name))
        })?;
        let func = overloads
            .iter()
            .find(|f| f.inputs.len() == args.len())
            .ok_or_else(|| {
                ScriptError::CalldataConstruction(format!(
                    "no overload of `{function}` takes {} arguments",
                    args.len()
                ))
            })?;

        let values = coerce_args(&func.inputs, args)?;
        func.abi_encode_input(&values)
            .map(Bytes::from)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
    }
}

/// Parse each argument according to the type of its parameter
fn coerce_args(params: &[Param], args: &[String]) -> Result<Vec<DynSolValue>, ScriptError> {
    if params.len() != args.len() {
        return Err(ScriptError::CalldataConstruction(format!(
            "expected {} arguments, got {}",
            params.len(),
            args.len()
        )));
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty: DynSolType = param
                .resolve()
                .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
            ty.coerce_str(arg).map_err(|e| {
                ScriptError::CalldataConstruction(format!("argument `{}`: {e}", param.name))
            })
        })
        .collect()
}

fn param_defs(params: &[Param]) -> Vec<ParamDef> {
    params
        .iter()
        .map(|p| ParamDef {
            name: p.name.clone(),
            ty: p.ty.clone(),
        })
        .collect()
}

// ---------
// | Store |
// ---------

/// Finds artifacts by contract name under a build output directory
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    /// The root of the build output
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load the artifact of `name`, searching the output tree breadth-first
    pub fn load(&self, name: &str) -> Result<Artifact, ScriptError> {
        let path = self.find(name)?;
        debug!("using artifact {}", path.display());

        let contents = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
        Artifact::from_json(name, &contents)
    }

    fn find(&self, name: &str) -> Result<PathBuf, ScriptError> {
        let file_name = format!("{name}.{ARTIFACT_EXTENSION}");
        let mut queue = VecDeque::from([self.root.clone()]);
        while let Some(dir) = queue.pop_front() {
            let mut paths = read_dir_paths(&dir)?;
            paths.sort();
            for path in paths {
                // Symlinked directories are not followed
                if fs::symlink_metadata(&path).is_ok_and(|m| m.is_dir()) {
                    queue.push_back(path);
                } else if path.file_name().is_some_and(|f| f == file_name.as_str()) {
                    return Ok(path);
                }
            }
        }

        Err(ScriptError::ArtifactParsing(format!(
            "no artifact for {} under {}",
            name,
            self.root.display()
        )))
    }
}

fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>, ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", dir.display(), e)))?;
    entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", dir.display(), e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use alloy::{
        dyn_abi::DynSolValue,
        primitives::{address, hex, U256},
    };
    use serde_json::json;
    use tempfile::TempDir;

    use super::{Artifact, ArtifactStore};

    /// The ABI of an ownable token with an access-controlled `mint`
    pub fn token_abi() -> serde_json::Value {
        json!([
            {
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    { "name": "owner", "type": "address", "internalType": "address" },
                    { "name": "supply", "type": "uint256", "internalType": "uint256" }
                ]
            },
            {
                "type": "function",
                "name": "mint",
                "stateMutability": "nonpayable",
                "inputs": [
                    { "name": "to", "type": "address", "internalType": "address" },
                    { "name": "amount", "type": "uint256", "internalType": "uint256" }
                ],
                "outputs": []
            },
            {
                "type": "function",
                "name": "initialize",
                "stateMutability": "nonpayable",
                "inputs": [
                    { "name": "owner", "type": "address", "internalType": "address" }
                ],
                "outputs": []
            }
        ])
    }

    /// The ABI of the upgradeable proxy constructor
    pub fn proxy_abi() -> serde_json::Value {
        json!([
            {
                "type": "constructor",
                "stateMutability": "payable",
                "inputs": [
                    { "name": "_logic", "type": "address", "internalType": "address" },
                    { "name": "admin_", "type": "address", "internalType": "address" },
                    { "name": "_data", "type": "bytes", "internalType": "bytes" }
                ]
            }
        ])
    }

    /// Write a Hardhat-style artifact for `name` under `dir`
    pub fn write_artifact(dir: &Path, name: &str, abi: serde_json::Value) {
        let contract_dir = dir.join("contracts").join(format!("{name}.sol"));
        std::fs::create_dir_all(&contract_dir).unwrap();
        let artifact = json!({
            "contractName": name,
            "abi": abi,
            "bytecode": "0x6080604052",
        });
        std::fs::write(
            contract_dir.join(format!("{name}.json")),
            serde_json::to_string(&artifact).unwrap(),
        )
        .unwrap();
        std::fs::write(contract_dir.join(format!("{name}.dbg.json")), "{}").unwrap();
    }

    #[test]
    fn test_encode_constructor() {
        let dir = TempDir::new().unwrap();
        write_artifact(dir.path(), "Token", token_abi());
        let artifact = ArtifactStore::new(dir.path()).load("Token").unwrap();

        let owner = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string();
        let encoded = artifact
            .encode_constructor(&[owner.clone(), "1000".to_string()])
            .unwrap();

        let expected_args = DynSolValue::Tuple(vec![
            DynSolValue::Address(address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")),
            DynSolValue::Uint(U256::from(1000), 256),
        ])
        .abi_encode_params();
        let mut expected = hex::decode("6080604052").unwrap();
        expected.extend_from_slice(&expected_args);

        assert_eq!(encoded.deploy_code.to_vec(), expected);
        assert_eq!(encoded.arguments, vec![json!(owner), json!("1000")]);
        assert_eq!(encoded.parameter_defs[1].name, "supply");
        assert_eq!(encoded.parameter_defs[1].ty, "uint256");
    }

    #[test]
    fn test_encode_constructor_arity_mismatch() {
        let artifact = Artifact::from_json(
            "Token",
            &json!({ "abi": token_abi(), "bytecode": "0x00" }).to_string(),
        )
        .unwrap();

        assert!(artifact.encode_constructor(&["1".to_string()]).is_err());
    }

    #[test]
    fn test_encode_call_selector() {
        let artifact = Artifact::from_json(
            "Token",
            &json!({ "abi": token_abi(), "bytecode": { "object": "0x00" } }).to_string(),
        )
        .unwrap();

        let calldata = artifact
            .encode_call(
                "mint",
                &["0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(), "5".to_string()],
            )
            .unwrap();
        // keccak256("mint(address,uint256)")[..4]
        assert_eq!(&calldata[..4], &hex::decode("40c10f19").unwrap()[..]);
        assert_eq!(calldata.len(), 4 + 64);
        assert!(artifact.encode_call("burn", &[]).is_err());
    }

    #[test]
    fn test_unlinked_bytecode_rejected() {
        let contents = json!({
            "abi": [],
            "bytecode": "0x73__$c5e4b5d8ef4bb48b0a7c61b29ee4bdb9c6$__63",
        })
        .to_string();
        assert!(Artifact::from_json("Lib", &contents).is_err());
    }

    #[test]
    fn test_missing_artifact() {
        let dir = TempDir::new().unwrap();
        assert!(ArtifactStore::new(dir.path()).load("Token").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_artifact_search_ignores_symlinked_dirs() {
        let dir = TempDir::new().unwrap();
        let build = dir.path().join("build");
        std::fs::create_dir_all(build.join("sub")).unwrap();
        std::os::unix::fs::symlink(&build, build.join("sub").join("loop")).unwrap();
        let outside = dir.path().join("outside");
        write_artifact(&outside, "Token", token_abi());
        std::os::unix::fs::symlink(&outside, build.join("linked")).unwrap();

        assert!(ArtifactStore::new(&build).load("Token").is_err());
    }
}
